//! Common test utilities for integration tests.
//!
//! Each test spins up the real router over HTTP against its own in-memory
//! SQLite database, then drives it with reqwest.

#![allow(dead_code)]

pub mod fixtures;

use std::str::FromStr;
use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use uuid::Uuid;

use geometa_catalog::api::{routes::create_router, AppState};
use geometa_catalog::config::Config;
use geometa_catalog::db::MIGRATOR;
use geometa_catalog::services::user_service::{CreateUserRequest, UserService};

pub const TEST_PASSWORD: &str = "orbital-pixel-42";

/// A running application instance backed by its own database.
pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    pub db: SqlitePool,
}

/// Start the app on an ephemeral port with a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid sqlite url")
        .foreign_keys(true);
    // A single connection keeps every query on the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("connect to in-memory sqlite");
    MIGRATOR.run(&pool).await.expect("run migrations");

    let config = Config {
        database_url: "sqlite::memory:".into(),
        bind_address: "127.0.0.1:0".into(),
        log_level: "info".into(),
        jwt_secret: "integration-test-secret".into(),
        jwt_access_token_expiry_minutes: 30,
        jwt_refresh_token_expiry_days: 7,
        admin_email: "admin@localhost".into(),
        admin_password: None,
    };

    let state = Arc::new(AppState::new(config, pool.clone()));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve test app");
    });

    TestApp {
        base_url: format!("http://{addr}"),
        client: Client::new(),
        db: pool,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create a user directly through the service layer.
    pub async fn create_user(&self, email: &str, role: &str) -> Uuid {
        let user = UserService::new(self.db.clone())
            .create(&CreateUserRequest {
                email: email.to_string(),
                name: "Test User".to_string(),
                password: Some(TEST_PASSWORD.to_string()),
                role: Some(role.to_string()),
                organization: Some("Test Org".to_string()),
            })
            .await
            .expect("create test user");
        user.id
    }

    /// Log in and return the access token.
    pub async fn login(&self, email: &str) -> String {
        let response = self
            .client
            .post(self.url("/api/v1/auth/login"))
            .json(&json!({ "email": email, "password": TEST_PASSWORD }))
            .send()
            .await
            .expect("login request");
        assert_eq!(response.status(), 200, "login should succeed for {email}");
        let body: Value = response.json().await.expect("login body");
        body["access_token"]
            .as_str()
            .expect("access token in login response")
            .to_string()
    }

    /// Create a user and log them in.
    pub async fn signup(&self, email: &str, role: &str) -> (Uuid, String) {
        let id = self.create_user(email, role).await;
        let token = self.login(email).await;
        (id, token)
    }

    /// POST a metadata payload as the given user, returning the response.
    pub async fn post_metadata(&self, token: &str, payload: &Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/v1/metadata"))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await
            .expect("create metadata request")
    }

    /// Create a metadata aggregate and return its parsed body.
    pub async fn create_metadata(&self, token: &str, payload: &Value) -> Value {
        let response = self.post_metadata(token, payload).await;
        assert_eq!(response.status(), 201, "metadata create should succeed");
        response.json().await.expect("metadata body")
    }

    /// GET a metadata aggregate by id.
    pub async fn get_metadata(&self, token: &str, id: &str) -> reqwest::Response {
        self.client
            .get(self.url(&format!("/api/v1/metadata/{id}")))
            .bearer_auth(token)
            .send()
            .await
            .expect("get metadata request")
    }

    /// Count rows in a table, for checking cascade behavior.
    pub async fn count_rows(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.db)
            .await
            .expect("count rows")
    }
}
