/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP
 * server: configuration loading, engine wiring, and route configuration.
 *
 * # Initialization Process
 *
 * 1. Connect the database pool and run migrations
 * 2. Load JWT configuration
 * 3. Wire the contact engine to its SQL collaborators
 * 4. Create the router with all routes and middleware
 */

use axum::Router;
use sqlx::SqlitePool;

use crate::auth::sessions::JwtConfig;
use crate::contacts::engine::ContactEngine;
use crate::contacts::identity::SqlIdentityLookup;
use crate::contacts::store::SqliteRelationStore;
use crate::routes::router::create_router;
use crate::server::config::{load_database, load_jwt_config};
use crate::server::state::AppState;

/// Create and configure the Axum application from the environment.
pub async fn create_app() -> Result<Router, sqlx::Error> {
    tracing::info!("Initializing shoal backend server");
    let pool = load_database().await?;
    let jwt = load_jwt_config();
    Ok(build_app(pool, jwt))
}

/// Assemble the application around an existing pool and JWT configuration.
/// Tests use this directly with an in-memory database.
pub fn build_app(pool: SqlitePool, jwt: JwtConfig) -> Router {
    let contacts = ContactEngine::new(
        SqlIdentityLookup::new(pool.clone()),
        SqliteRelationStore::new(pool.clone()),
    );
    let state = AppState {
        db: pool,
        jwt,
        contacts,
    };
    create_router(state)
}
