/**
 * API Route Handlers
 *
 * Route tables for the API surface.
 *
 * # Routes
 *
 * ## Authentication (public)
 * - `POST /api/auth/register` - Account registration
 * - `POST /api/auth/login` - Credential login
 * - `POST /api/auth/refresh` - Access token renewal
 *
 * ## Protected (bearer access token required)
 * - `GET /api/auth/me` - Current user
 * - `GET /api/contacts` - Accepted contacts
 * - `GET /api/contacts/requests` - Incoming contact requests
 * - `POST /api/contacts` - Request a contact
 * - `POST /api/contacts/accept` - Accept a request
 * - `DELETE /api/contacts?user=` - Remove a contact
 * - `GET /api/rooms/{room_id}/messages` - Message history
 * - `POST /api/rooms/{room_id}/messages` - Append a message
 */

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::handlers::{get_me, login, refresh, register};
use crate::chat::handlers::{get_history, post_message};
use crate::contacts::handlers::{
    accept_contact, add_contact, incoming_requests, list_contacts, remove_contact,
};
use crate::server::state::AppState;

/// Routes reachable without a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
}

/// Routes that require an authenticated caller. The auth middleware layer
/// is applied in `router.rs`.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(get_me))
        .route(
            "/api/contacts",
            get(list_contacts).post(add_contact).delete(remove_contact),
        )
        .route("/api/contacts/requests", get(incoming_requests))
        .route("/api/contacts/accept", post(accept_contact))
        .route(
            "/api/rooms/{room_id}/messages",
            get(get_history).post(post_message),
        )
}
