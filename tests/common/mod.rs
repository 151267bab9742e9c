//! Shared helpers for the REST integration tests: spin the real server on a
//! random port against a throwaway data dir.

#![allow(dead_code)]

use revloop::{config::ServerConfig, rest, storage::Storage, AppContext};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

/// Find a free local port by binding to port 0.
pub fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

pub struct TestServer {
    /// Base URL including the /api/v1 prefix.
    pub base: String,
    /// Direct handle to the server's store, for fixtures HTTP cannot set up
    /// (e.g. sessions with a custom TTL).
    pub storage: Arc<Storage>,
    // Keep the data dir alive for the duration of the test.
    _dir: TempDir,
}

/// Start revloopd on a random port with a fresh database.
pub async fn spawn_server() -> TestServer {
    let dir = TempDir::new().unwrap();
    let port = find_free_port();
    let config = Arc::new(ServerConfig::new(
        Some(port),
        Some(dir.path().to_path_buf()),
        Some("error".to_string()),
        None,
    ));
    let storage = Arc::new(Storage::new(dir.path()).await.unwrap());
    let ctx = Arc::new(AppContext {
        config,
        storage: storage.clone(),
        started_at: std::time::Instant::now(),
    });

    tokio::spawn(async move {
        let _ = rest::start_rest_server(ctx).await;
    });

    // Give the server a moment to start
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    TestServer {
        base: format!("http://127.0.0.1:{port}/api/v1"),
        storage,
        _dir: dir,
    }
}

/// Register an account and return its bearer token.
pub async fn register_user(client: &reqwest::Client, base: &str, email: &str) -> String {
    let res = client
        .post(format!("{base}/auth/register"))
        .json(&json!({ "email": email, "password": "hunter2hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201, "registration should succeed");
    let body: Value = res.json().await.unwrap();
    body["data"]["token"].as_str().unwrap().to_string()
}

/// A profile submission that passes every validation rule.
pub fn valid_profile() -> Value {
    json!({
        "businessName": "Blue Bottle Plumbing",
        "phone": "415-555-0134",
        "email": "owner@bluebottleplumbing.com",
        "googleReviewUrl": "https://g.page/r/bluebottle/review",
        "facebookReviewUrl": "",
        "yelpReviewUrl": "",
    })
}

/// Submit a valid profile for the given token, asserting success.
pub async fn create_profile(client: &reqwest::Client, base: &str, token: &str) -> Value {
    let res = client
        .post(format!("{base}/profile"))
        .bearer_auth(token)
        .json(&valid_profile())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201, "profile creation should succeed");
    let body: Value = res.json().await.unwrap();
    body["data"].clone()
}
