/**
 * Login Handler
 *
 * Implements `POST /api/auth/login`.
 *
 * # Security
 *
 * - Passwords are verified with bcrypt
 * - Unknown user and wrong password return the same 401, so the endpoint
 *   does not leak which usernames exist
 */

use axum::{extract::State, response::Json};
use bcrypt::verify;

use crate::auth::handlers::types::{AuthResponse, LoginRequest};
use crate::auth::sessions::{create_token, TokenKind};
use crate::auth::users::get_user_by_username;
use crate::contacts::identity::normalize_handle;
use crate::error::ApiError;
use crate::server::state::AppState;

/// Login handler
///
/// # Errors
///
/// * `401 Unauthorized` - unknown user or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let username = normalize_handle(&request.username);

    let user = get_user_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| {
            tracing::warn!(username = %username, "login for unknown user");
            ApiError::InvalidCredentials
        })?;

    let valid = verify(&request.password, &user.password_hash).map_err(|e| {
        tracing::error!("password verification error: {:?}", e);
        ApiError::Internal
    })?;
    if !valid {
        tracing::warn!(username = %username, "wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let access_token =
        create_token(&state.jwt, user.id, &user.username, TokenKind::Access).map_err(|e| {
            tracing::error!("failed to create token: {:?}", e);
            ApiError::Internal
        })?;
    let refresh_token =
        create_token(&state.jwt, user.id, &user.username, TokenKind::Refresh).map_err(|e| {
            tracing::error!("failed to create token: {:?}", e);
            ApiError::Internal
        })?;

    tracing::info!(username = %user.username, "login");

    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        username: user.username,
    }))
}
