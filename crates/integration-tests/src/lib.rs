//! Live integration tests for the ProShop services.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations and bootstrap an admin
//! cargo run -p proshop-cli -- migrate
//! ADMIN_PASSWORD=... cargo run -p proshop-cli -- admin create -e admin@example.com -n Admin
//!
//! # Start the services, then run the ignored tests
//! cargo test -p proshop-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `API_BASE_URL` - account API (default: <http://localhost:5000>)
//! - `STOREFRONT_BASE_URL` - storefront (default: <http://localhost:3000>)
//! - `ADMIN_EMAIL` / `ADMIN_PASSWORD` - an existing admin account

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Base URL for the account API.
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// Base URL for the storefront.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// An email address no other test run has used.
#[must_use]
pub fn unique_email() -> String {
    format!("it-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// Register a fresh account and return the response body.
///
/// # Panics
///
/// Panics if the API is unreachable or rejects the registration.
pub async fn register(client: &Client, name: &str, email: &str, password: &str) -> Value {
    let resp = client
        .post(format!("{}/api/users", api_base_url()))
        .json(&json!({ "name": name, "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to reach API");

    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("Failed to decode registration")
}

/// Log in as the admin named by `ADMIN_EMAIL` / `ADMIN_PASSWORD`.
///
/// # Panics
///
/// Panics if the variables are unset or the login fails.
pub async fn admin_token(client: &Client) -> String {
    let email = std::env::var("ADMIN_EMAIL").expect("ADMIN_EMAIL must be set");
    let password = std::env::var("ADMIN_PASSWORD").expect("ADMIN_PASSWORD must be set");

    let resp = client
        .post(format!("{}/api/users/login", api_base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to reach API");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to decode login");
    assert_eq!(body["isAdmin"], true, "ADMIN_EMAIL is not an admin");
    body["token"]
        .as_str()
        .expect("Login response has no token")
        .to_string()
}
