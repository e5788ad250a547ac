/**
 * User Model and Database Operations
 *
 * This module handles account rows and their database operations. Usernames
 * are stored normalized (trimmed, lowercase) and are unique.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// An account row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Stable numeric account id
    pub id: i64,
    /// Normalized handle (unique)
    pub username: String,
    /// Hashed password (bcrypt)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
}

/// Create a new user
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `username` - Normalized handle
/// * `password_hash` - Hashed password
///
/// # Returns
/// Created user or error
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
    )
    .bind(username)
    .bind(password_hash)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(User {
        id: result.last_insert_rowid(),
        username: username.to_string(),
        password_hash: password_hash.to_string(),
        created_at: now,
    })
}

/// Get user by username
pub async fn get_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

/// Get user by ID
pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, created_at FROM users WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Check whether a username is already taken
pub async fn username_exists(pool: &SqlitePool, username: &str) -> Result<bool, sqlx::Error> {
    let (exists,): (i64,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)")
            .bind(username)
            .fetch_one(pool)
            .await?;
    Ok(exists != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        sqlx::migrate!().run(&pool).await.expect("migrations");
        pool
    }

    #[tokio::test]
    async fn test_create_and_fetch_user() {
        let pool = test_pool().await;
        let user = create_user(&pool, "alice", "hash").await.unwrap();
        assert!(user.id > 0);

        let by_name = get_user_by_username(&pool, "alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);

        let by_id = get_user_by_id(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");
    }

    #[tokio::test]
    async fn test_username_exists() {
        let pool = test_pool().await;
        assert!(!username_exists(&pool, "alice").await.unwrap());
        create_user(&pool, "alice", "hash").await.unwrap();
        assert!(username_exists(&pool, "alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let pool = test_pool().await;
        create_user(&pool, "alice", "hash").await.unwrap();
        let result = create_user(&pool, "alice", "hash").await;
        assert!(result.is_err());
    }
}
