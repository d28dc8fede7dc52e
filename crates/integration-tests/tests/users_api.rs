//! Live tests for the account API.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database
//! - The API running (cargo run -p proshop-api)
//! - `ADMIN_EMAIL` / `ADMIN_PASSWORD` for the admin tests

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use proshop_integration_tests::{admin_token, api_base_url, register, unique_email};

// ============================================================================
// Public
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API and database"]
async fn test_health() {
    let resp = Client::new()
        .get(format!("{}/health", api_base_url()))
        .send()
        .await
        .expect("Failed to reach API");

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API and database"]
async fn test_register_then_login() {
    let client = Client::new();
    let email = unique_email();

    let registered = register(&client, "Jane Doe", &email, "123456").await;
    assert_eq!(registered["email"], email.as_str());
    assert_eq!(registered["isAdmin"], false);

    let resp = client
        .post(format!("{}/api/users/login", api_base_url()))
        .json(&json!({ "email": email, "password": "123456" }))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to decode login");
    assert_eq!(body["_id"], registered["_id"]);
}

#[tokio::test]
#[ignore = "Requires running API and database"]
async fn test_duplicate_registration_rejected() {
    let client = Client::new();
    let email = unique_email();
    register(&client, "Jane Doe", &email, "123456").await;

    let resp = client
        .post(format!("{}/api/users", api_base_url()))
        .json(&json!({ "name": "Jane Again", "email": email, "password": "654321" }))
        .send()
        .await
        .expect("Failed to reach API");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to decode error");
    assert_eq!(body["message"], "User already exists");
}

#[tokio::test]
#[ignore = "Requires running API and database"]
async fn test_wrong_password_rejected() {
    let client = Client::new();
    let email = unique_email();
    register(&client, "Jane Doe", &email, "123456").await;

    let resp = client
        .post(format!("{}/api/users/login", api_base_url()))
        .json(&json!({ "email": email, "password": "wrong" }))
        .send()
        .await
        .expect("Failed to reach API");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("Failed to decode error");
    assert_eq!(body["message"], "Invalid email or password");
}

// ============================================================================
// Private
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API and database"]
async fn test_profile_round_trip() {
    let client = Client::new();
    let email = unique_email();
    let registered = register(&client, "Jane Doe", &email, "123456").await;
    let token = registered["token"].as_str().expect("token");

    let resp = client
        .put(format!("{}/api/users/profile", api_base_url()))
        .bearer_auth(token)
        .json(&json!({ "name": "Jane Smith" }))
        .send()
        .await
        .expect("Failed to update profile");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{}/api/users/profile", api_base_url()))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to get profile");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to decode profile");
    assert_eq!(body["name"], "Jane Smith");
    assert_eq!(body["email"], email.as_str());
}

#[tokio::test]
#[ignore = "Requires running API and database"]
async fn test_profile_requires_token() {
    let resp = Client::new()
        .get(format!("{}/api/users/profile", api_base_url()))
        .send()
        .await
        .expect("Failed to reach API");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API, database and an admin account"]
async fn test_admin_manages_user() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let email = unique_email();
    let registered = register(&client, "Jane Doe", &email, "123456").await;
    let id = registered["_id"].as_str().expect("id");
    let url = format!("{}/api/users/{id}", api_base_url());

    let resp = client
        .get(&url)
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get user");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .put(&url)
        .bearer_auth(&token)
        .json(&json!({ "name": "Jane Admin", "isAdmin": true }))
        .send()
        .await
        .expect("Failed to update user");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to decode update");
    assert_eq!(body["isAdmin"], true);

    let resp = client
        .delete(&url)
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to delete user");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(&url)
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to get user");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API and database"]
async fn test_non_admin_forbidden() {
    let client = Client::new();
    let registered = register(&client, "Jane Doe", &unique_email(), "123456").await;

    let resp = client
        .get(format!("{}/api/users", api_base_url()))
        .bearer_auth(registered["token"].as_str().expect("token"))
        .send()
        .await
        .expect("Failed to reach API");

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = resp.json().await.expect("Failed to decode error");
    assert_eq!(body["message"], "Not authorized as an admin");
}
