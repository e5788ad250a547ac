//! Shared test fixtures: in-memory database, test server, auth helpers.

#![allow(dead_code)]

use axum_test::TestServer;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use shoal::auth::sessions::JwtConfig;
use shoal::contacts::relation::RelationStatus;
use shoal::server::build_app;

/// Create an in-memory SQLite pool with the schema applied. A single
/// connection keeps every query on the same in-memory database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

pub fn test_jwt() -> JwtConfig {
    JwtConfig {
        secret: "test-secret".to_string(),
        access_ttl_secs: 900,
        refresh_ttl_secs: 7 * 24 * 60 * 60,
    }
}

/// A test server plus direct access to its database.
pub struct TestApp {
    pub server: TestServer,
    pub pool: SqlitePool,
}

pub async fn spawn_app() -> TestApp {
    let pool = test_pool().await;
    let app = build_app(pool.clone(), test_jwt());
    let server = TestServer::new(app).expect("Failed to start test server");
    TestApp { server, pool }
}

/// Register an account and return its access token.
pub async fn register_user(server: &TestServer, username: &str, password: &str) -> String {
    let response = server
        .post("/api/auth/register")
        .json(&serde_json::json!({
            "username": username,
            "password": password,
        }))
        .await;
    assert_eq!(
        response.status_code(),
        axum::http::StatusCode::OK,
        "registration failed: {}",
        response.text()
    );
    let body: serde_json::Value = response.json();
    body["accessToken"]
        .as_str()
        .expect("accessToken in response")
        .to_string()
}

/// Bearer header value for a token.
pub fn bearer(token: &str) -> axum::http::HeaderValue {
    axum::http::HeaderValue::from_str(&format!("Bearer {token}")).expect("header value")
}

/// Account id for a registered username.
pub async fn user_id(pool: &SqlitePool, username: &str) -> i64 {
    let (id,): (i64,) = sqlx::query_as("SELECT id FROM users WHERE username = ?1")
        .bind(username)
        .fetch_one(pool)
        .await
        .expect("user id");
    id
}

/// Insert a relation row directly, with an explicit timestamp. Used to set
/// up states the API alone cannot reach (mirrored pairs, blocks).
pub async fn insert_relation(
    pool: &SqlitePool,
    owner_id: i64,
    target_id: i64,
    status: RelationStatus,
    created_at: DateTime<Utc>,
) {
    sqlx::query(
        "INSERT INTO contacts (owner_id, target_id, status, created_at) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(owner_id)
    .bind(target_id)
    .bind(status)
    .bind(created_at)
    .execute(pool)
    .await
    .expect("insert relation");
}
