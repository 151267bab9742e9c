//! Integration tests for customers and the review-request lifecycle.

mod common;

use common::{create_profile, register_user, spawn_server};
use serde_json::{json, Value};

async fn setup_customer(
    client: &reqwest::Client,
    base: &str,
    token: &str,
) -> String {
    let res = client
        .post(format!("{base}/customers"))
        .bearer_auth(token)
        .json(&json!({ "name": "Dana Alvarez", "phone": "415-555-0199", "email": "dana@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let body: Value = res.json().await.unwrap();
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn create_request(
    client: &reqwest::Client,
    base: &str,
    token: &str,
    customer_id: &str,
) -> String {
    let res = client
        .post(format!("{base}/review-requests"))
        .bearer_auth(token)
        .json(&json!({ "customerId": customer_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["status"], "pending");
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn transition(
    client: &reqwest::Client,
    base: &str,
    token: &str,
    id: &str,
    status: &str,
) -> reqwest::Response {
    client
        .post(format!("{base}/review-requests/{id}/status"))
        .bearer_auth(token)
        .json(&json!({ "status": status }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn customer_operations_require_a_profile() {
    let srv = spawn_server().await;
    let client = reqwest::Client::new();
    let token = register_user(&client, &srv.base, "noprofile@example.com").await;

    let res = client
        .post(format!("{}/customers", srv.base))
        .bearer_auth(&token)
        .json(&json!({ "name": "Dana Alvarez" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Business profile not found");
}

#[tokio::test]
async fn create_and_list_customers() {
    let srv = spawn_server().await;
    let client = reqwest::Client::new();
    let token = register_user(&client, &srv.base, "shop@example.com").await;
    create_profile(&client, &srv.base, &token).await;

    setup_customer(&client, &srv.base, &token).await;

    let res = client
        .get(format!("{}/customers", srv.base))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    let customers = body["data"].as_array().unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0]["name"], "Dana Alvarez");

    // A nameless customer is rejected before any write.
    let res = client
        .post(format!("{}/customers", srv.base))
        .bearer_auth(&token)
        .json(&json!({ "name": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn full_lifecycle_happy_path() {
    let srv = spawn_server().await;
    let client = reqwest::Client::new();
    let token = register_user(&client, &srv.base, "lifecycle@example.com").await;
    create_profile(&client, &srv.base, &token).await;
    let customer_id = setup_customer(&client, &srv.base, &token).await;
    let request_id = create_request(&client, &srv.base, &token, &customer_id).await;

    let res = transition(&client, &srv.base, &token, &request_id, "sent").await;
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["status"], "sent");
    assert!(body["data"]["sentAt"].is_string());

    let res = transition(&client, &srv.base, &token, &request_id, "clicked").await;
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert!(body["data"]["clickedAt"].is_string());

    let res = transition(&client, &srv.base, &token, &request_id, "reviewed").await;
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["status"], "reviewed");

    // reviewed is terminal.
    let res = transition(&client, &srv.base, &token, &request_id, "sent").await;
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn illegal_transitions_are_rejected() {
    let srv = spawn_server().await;
    let client = reqwest::Client::new();
    let token = register_user(&client, &srv.base, "strict@example.com").await;
    create_profile(&client, &srv.base, &token).await;
    let customer_id = setup_customer(&client, &srv.base, &token).await;
    let request_id = create_request(&client, &srv.base, &token, &customer_id).await;

    // pending may not jump straight to reviewed or clicked.
    for status in ["reviewed", "clicked"] {
        let res = transition(&client, &srv.base, &token, &request_id, status).await;
        assert_eq!(res.status(), 400, "pending -> {status} should be rejected");
    }

    // Unknown status strings fail validation.
    let res = transition(&client, &srv.base, &token, &request_id, "shipped").await;
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Validation failed");

    // Anything may fail.
    let res = transition(&client, &srv.base, &token, &request_id, "failed").await;
    assert_eq!(res.status(), 200);
    let res = transition(&client, &srv.base, &token, &request_id, "sent").await;
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn tenants_cannot_see_each_other() {
    let srv = spawn_server().await;
    let client = reqwest::Client::new();

    let token_a = register_user(&client, &srv.base, "alpha@example.com").await;
    create_profile(&client, &srv.base, &token_a).await;
    let customer_a = setup_customer(&client, &srv.base, &token_a).await;
    let request_a = create_request(&client, &srv.base, &token_a, &customer_a).await;

    let token_b = register_user(&client, &srv.base, "beta@example.com").await;
    create_profile(&client, &srv.base, &token_b).await;

    // B sees no customers and cannot reference A's.
    let res = client
        .get(format!("{}/customers", srv.base))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let res = client
        .post(format!("{}/review-requests", srv.base))
        .bearer_auth(&token_b)
        .json(&json!({ "customerId": customer_a }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    // B cannot transition A's request either.
    let res = transition(&client, &srv.base, &token_b, &request_a, "sent").await;
    assert_eq!(res.status(), 404);
}
