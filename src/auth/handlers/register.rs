/**
 * Registration Handler
 *
 * Implements `POST /api/auth/register`.
 *
 * # Registration Process
 *
 * 1. Normalize and validate the requested handle
 * 2. Validate password length
 * 3. Check the handle is free
 * 4. Hash the password with bcrypt
 * 5. Create the account and issue a token pair
 *
 * # Validation
 *
 * - Handles are 3-50 characters from `a-z 0-9 . _ -` after normalization
 * - Passwords must be at least 6 characters
 */

use axum::{extract::State, response::Json};
use bcrypt::{hash, DEFAULT_COST};

use crate::auth::handlers::types::{AuthResponse, RegisterRequest};
use crate::auth::sessions::{create_token, TokenKind};
use crate::auth::users::{create_user, username_exists};
use crate::contacts::identity::normalize_handle;
use crate::error::ApiError;
use crate::server::state::AppState;

/// Validate a normalized handle: 3-50 chars from `a-z 0-9 . _ -`.
fn is_valid_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 50 {
        return false;
    }
    username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
}

/// Registration handler
///
/// # Errors
///
/// * `400 Bad Request` - invalid handle or password too short
/// * `409 Conflict` - handle already taken
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let username = normalize_handle(&request.username);

    if !is_valid_username(&username) {
        tracing::warn!(username = %username, "rejected invalid username");
        return Err(ApiError::Invalid(
            "invalid username; use a-z, 0-9, . _ - (3-50 chars)".to_string(),
        ));
    }
    if request.password.len() < 6 {
        return Err(ApiError::Invalid(
            "password must be at least 6 characters".to_string(),
        ));
    }

    if username_exists(&state.db, &username).await? {
        tracing::warn!(username = %username, "username already taken");
        return Err(ApiError::Conflict("username already taken".to_string()));
    }

    let password_hash = hash(&request.password, DEFAULT_COST).map_err(|e| {
        tracing::error!("failed to hash password: {:?}", e);
        ApiError::Internal
    })?;

    let user = match create_user(&state.db, &username, &password_hash).await {
        Ok(user) => user,
        // Two concurrent registrations can both pass the existence check;
        // the unique index decides.
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(ApiError::Conflict("username already taken".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

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

    tracing::info!(username = %user.username, id = user.id, "user registered");

    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        username: user.username,
    }))
}
