//! Integration tests for the Hearthside API.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and seed a test database, then start the API
//! cargo run -p hearthside-cli -- migrate
//! cargo run -p hearthside-cli -- seed
//! cargo run -p hearthside-api
//!
//! # Run the ignored integration tests against it
//! cargo test -p hearthside-integration-tests -- --ignored
//! ```
//!
//! Tests register throwaway users with unique emails, so re-runs do not
//! collide; they assume the seeded development catalog is present.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("HEARTHSIDE_BASE_URL").unwrap_or_else(|_| "http://localhost:3015".to_string())
}

/// A registered test user with their bearer token.
pub struct TestUser {
    pub email: String,
    pub token: String,
}

/// Client plus base URL for one test run.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Create a context pointed at the configured API.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: base_url(),
        }
    }

    /// GET an unauthenticated endpoint.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(format!("{}{path}", self.base_url))
    }

    /// GET with a bearer token.
    pub fn get_auth(&self, path: &str, user: &TestUser) -> RequestBuilder {
        self.get(path).bearer_auth(&user.token)
    }

    /// POST JSON with a bearer token.
    pub fn post_auth(&self, path: &str, user: &TestUser, body: &Value) -> RequestBuilder {
        self.client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&user.token)
            .json(body)
    }

    /// PUT JSON with a bearer token.
    pub fn put_auth(&self, path: &str, user: &TestUser, body: &Value) -> RequestBuilder {
        self.client
            .put(format!("{}{path}", self.base_url))
            .bearer_auth(&user.token)
            .json(body)
    }

    /// DELETE with a bearer token.
    pub fn delete_auth(&self, path: &str, user: &TestUser) -> RequestBuilder {
        self.client
            .delete(format!("{}{path}", self.base_url))
            .bearer_auth(&user.token)
    }

    /// Register a throwaway user and return their token.
    ///
    /// # Panics
    ///
    /// Panics if registration fails; every integration test needs it.
    pub async fn register_user(&self) -> TestUser {
        let email = format!("it-{}@example.com", Uuid::new_v4().simple());
        let body = json!({
            "email": email,
            "password": "integration-test-password",
            "firstName": "Test",
            "lastName": "User",
        });

        let resp = self
            .client
            .post(format!("{}/api/auth/register", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("register request failed");
        assert_eq!(resp.status(), 201, "registration should succeed");

        let envelope: Value = resp.json().await.expect("register response not JSON");
        assert_eq!(envelope["success"], true);
        let token = envelope["data"]["token"]
            .as_str()
            .expect("register response missing token")
            .to_string();

        TestUser { email, token }
    }

    /// The slug of some in-stock product from the seeded catalog.
    ///
    /// # Panics
    ///
    /// Panics if the catalog is empty.
    pub async fn any_product(&self) -> Value {
        let resp = self
            .get("/api/products?limit=1")
            .send()
            .await
            .expect("product listing failed");
        let envelope: Value = resp.json().await.expect("listing response not JSON");
        envelope["data"]["products"]
            .as_array()
            .and_then(|products| products.first())
            .expect("seeded catalog is empty")
            .clone()
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unwrap the `data` field of a success envelope, asserting the shape.
#[must_use]
pub fn expect_data(envelope: &Value) -> &Value {
    assert_eq!(
        envelope["success"], true,
        "expected success envelope, got: {envelope}"
    );
    &envelope["data"]
}
