//! Integration tests for account registration, login, and session tokens.

mod common;

use common::{register_user, spawn_server};
use serde_json::{json, Value};

#[tokio::test]
async fn health_requires_no_auth() {
    let srv = spawn_server().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", srv.base))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn registration_returns_a_working_token() {
    let srv = spawn_server().await;
    let client = reqwest::Client::new();
    let token = register_user(&client, &srv.base, "new@example.com").await;

    // The token authenticates — a fresh account has no profile yet, so the
    // profile endpoint answers 404, not 401.
    let res = client
        .get(format!("{}/profile", srv.base))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let srv = spawn_server().await;
    let client = reqwest::Client::new();
    register_user(&client, &srv.base, "taken@example.com").await;

    let res = client
        .post(format!("{}/auth/register", srv.base))
        .json(&json!({ "email": "taken@example.com", "password": "hunter2hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 409);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn registration_validates_email_and_password() {
    let srv = spawn_server().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/register", srv.base))
        .json(&json!({ "email": "nope", "password": "short" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Validation failed");
    let details = body["details"].as_array().unwrap();
    assert!(details
        .iter()
        .any(|d| d.as_str().unwrap().starts_with("email:")));
    assert!(details
        .iter()
        .any(|d| d.as_str().unwrap().starts_with("password:")));
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let srv = spawn_server().await;
    let client = reqwest::Client::new();

    let user = srv
        .storage
        .create_user("stale@example.com", "hash")
        .await
        .unwrap();
    // A zero-hour TTL expires the session at mint time.
    let session = srv.storage.create_auth_session(&user.id, 0).await.unwrap();

    let res = client
        .get(format!("{}/profile", srv.base))
        .bearer_auth(&session.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn login_round_trip() {
    let srv = spawn_server().await;
    let client = reqwest::Client::new();
    register_user(&client, &srv.base, "login@example.com").await;

    // Wrong password and unknown email are the same 401.
    let res = client
        .post(format!("{}/auth/login", srv.base))
        .json(&json!({ "email": "login@example.com", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    let res = client
        .post(format!("{}/auth/login", srv.base))
        .json(&json!({ "email": "nobody@example.com", "password": "hunter2hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    // Correct credentials mint a fresh, working token.
    let res = client
        .post(format!("{}/auth/login", srv.base))
        .json(&json!({ "email": "login@example.com", "password": "hunter2hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    let token = body["data"]["token"].as_str().unwrap();

    let res = client
        .get(format!("{}/onboarding", srv.base))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
}
