/**
 * Application State Management
 *
 * This module defines the application state structure and implements the
 * `FromRef` traits for Axum state extraction.
 *
 * # Thread Safety
 *
 * Everything in `AppState` is cheaply cloneable: the sqlx pool is an Arc
 * internally and the contact engine only holds pool handles.
 */

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::auth::sessions::JwtConfig;
use crate::contacts::engine::ContactEngine;
use crate::contacts::identity::SqlIdentityLookup;
use crate::contacts::store::SqliteRelationStore;

/// The production contact engine wiring.
pub type Contacts = ContactEngine<SqlIdentityLookup, SqliteRelationStore>;

/// Central state container shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// JWT signing configuration
    pub jwt: JwtConfig,
    /// The contact relationship engine
    pub contacts: Contacts,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for JwtConfig {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

impl FromRef<AppState> for Contacts {
    fn from_ref(state: &AppState) -> Self {
        state.contacts.clone()
    }
}
