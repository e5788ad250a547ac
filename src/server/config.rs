/**
 * Server Configuration
 *
 * This module handles loading of server configuration from environment
 * variables, with sensible defaults for local development.
 *
 * # Configuration
 *
 * - `DATABASE_URL` - SQLite database (default `sqlite://shoal.db?mode=rwc`)
 * - `JWT_SECRET` - token signing secret
 * - `JWT_ACCESS_TTL_SECONDS` - access token lifetime (default 15 minutes)
 * - `JWT_REFRESH_TTL_SECONDS` - refresh token lifetime (default 7 days)
 * - `SERVER_PORT` - bind port (default 3000, read in main)
 */

use sqlx::SqlitePool;

use crate::auth::sessions::JwtConfig;

const DEFAULT_DATABASE_URL: &str = "sqlite://shoal.db?mode=rwc";
const DEFAULT_ACCESS_TTL_SECS: u64 = 15 * 60;
const DEFAULT_REFRESH_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Connect the database pool and run migrations.
///
/// Unlike most configuration, the database is not optional: every endpoint
/// reads or writes it, so a connection failure is a startup error.
pub async fn load_database() -> Result<SqlitePool, sqlx::Error> {
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    tracing::info!("Connecting to database...");
    let pool = SqlitePool::connect(&database_url).await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!().run(&pool).await?;
    tracing::info!("Database ready");

    Ok(pool)
}

/// Load JWT configuration from the environment.
pub fn load_jwt_config() -> JwtConfig {
    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using a development default");
        "dev-secret-change-me".to_string()
    });

    JwtConfig {
        secret,
        access_ttl_secs: env_u64("JWT_ACCESS_TTL_SECONDS", DEFAULT_ACCESS_TTL_SECS),
        refresh_ttl_secs: env_u64("JWT_REFRESH_TTL_SECONDS", DEFAULT_REFRESH_TTL_SECS),
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
