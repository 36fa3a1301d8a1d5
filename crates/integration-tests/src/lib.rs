//! Integration tests for the Leads Marketplace mobile API.
//!
//! These tests drive a running server over HTTP and are `#[ignore]`d by
//! default.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and start the API against a scratch database
//! cargo run -p leadmarket-cli -- migrate
//! cargo run -p leadmarket-api
//!
//! # Run integration tests
//! MOBILE_API_BASE_URL=http://localhost:3000 cargo test -p leadmarket-integration-tests -- --ignored
//! ```

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the mobile API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("MOBILE_API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A registration body with an email no other test run will have used.
#[must_use]
pub fn unique_registration(zipcodes: &[&str]) -> Value {
    json!({
        "email": format!("it-{}@example.com", Uuid::new_v4().simple()),
        "password": "integration-pass",
        "agency_name": "Integration Test Agency",
        "industry": "Insurance",
        "zipcodes": zipcodes,
    })
}

/// Register a fresh agency and return the full response body.
///
/// # Errors
///
/// Returns the transport error if the server cannot be reached.
pub async fn register(client: &Client, zipcodes: &[&str]) -> Result<Value, reqwest::Error> {
    client
        .post(format!("{}/api/mobile/auth/register", base_url()))
        .json(&unique_registration(zipcodes))
        .send()
        .await?
        .json()
        .await
}
