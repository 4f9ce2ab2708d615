//! End-to-end tests for the Favorites API.
//!
//! # Running Tests
//!
//! ```bash
//! # Prepare the database and start the server
//! cargo run -p favorites-cli -- migrate
//! cargo run -p favorites-api
//!
//! # Run the ignored end-to-end tests
//! cargo test -p favorites-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `API_BASE_URL` - Server under test (default `http://localhost:4200`)
//! - `DATABASE_URL` - Same database as the server, used to seed products

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

/// Shared handles for one test.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub pool: PgPool,
}

/// A registered, logged-in user.
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

impl TestContext {
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let base_url =
            std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:4200".to_string());
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to database");

        Self {
            client: Client::new(),
            base_url,
            pool,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    /// Register a user with a unique email and log in.
    pub async fn signup(&self) -> TestUser {
        let email = format!("e2e-{}@example.com", Uuid::new_v4().simple());

        let response = self
            .client
            .post(self.url("/accounts"))
            .json(&json!({ "name": "E2E User", "email": email, "passwordHash": "123456" }))
            .send()
            .await
            .expect("register request failed");
        assert_eq!(response.status(), StatusCode::CREATED);
        let user: Value = response.json().await.expect("register body");

        let response = self
            .client
            .post(self.url("/sessions"))
            .json(&json!({ "email": email, "password": "123456" }))
            .send()
            .await
            .expect("login request failed");
        assert_eq!(response.status(), StatusCode::CREATED);
        let session: Value = response.json().await.expect("login body");

        TestUser {
            id: user["id"].as_str().expect("user id").to_string(),
            email,
            token: session["access_token"]
                .as_str()
                .expect("access token")
                .to_string(),
        }
    }

    /// Insert a product straight into the mirror.
    pub async fn seed_product(&self, name: &str) -> String {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO products (name, image, price) VALUES ($1, 'http://image.com', 10.00) \
             RETURNING id",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .expect("Failed to seed product");
        id.to_string()
    }

    pub async fn get(&self, user: &TestUser, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .bearer_auth(&user.token)
            .send()
            .await
            .expect("GET failed")
    }

    pub async fn post(&self, user: &TestUser, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .bearer_auth(&user.token)
            .json(body)
            .send()
            .await
            .expect("POST failed")
    }

    pub async fn delete(&self, user: &TestUser, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(&user.token)
            .send()
            .await
            .expect("DELETE failed")
    }

    /// Remove a user (and, by cascade, their favorites).
    pub async fn cleanup(&self, user: &TestUser) {
        let _ = self.delete(user, &format!("/accounts/user/{}", user.id)).await;
    }
}
