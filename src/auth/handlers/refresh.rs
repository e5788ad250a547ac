//! Refresh handler: `POST /api/auth/refresh`.
//!
//! The refresh token may arrive either as a bearer token in the
//! Authorization header or as `{"refreshToken": ...}` in the body. Whichever
//! one verifies is used; the refresh token itself is kept and only a new
//! access token is returned.

use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    response::Json,
};

use crate::auth::handlers::types::{RefreshRequest, RefreshResponse};
use crate::auth::sessions::{create_token, verify_token, Claims, TokenKind};
use crate::error::ApiError;
use crate::server::state::AppState;

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Refresh handler
///
/// # Errors
///
/// * `401 Unauthorized` - no valid refresh token in header or body
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RefreshResponse>, ApiError> {
    let header_token = bearer_token(&headers);
    let body_token = serde_json::from_slice::<RefreshRequest>(&body)
        .ok()
        .and_then(|r| r.refresh_token);

    let claims: Claims = [header_token, body_token]
        .into_iter()
        .flatten()
        .find_map(|token| verify_token(&state.jwt, &token, TokenKind::Refresh).ok())
        .ok_or_else(|| {
            tracing::warn!("refresh with no valid refresh token");
            ApiError::InvalidRefreshToken
        })?;

    let user_id = claims.user_id().map_err(|e| {
        tracing::error!("invalid account id in refresh token: {:?}", e);
        ApiError::Internal
    })?;

    let access_token = create_token(&state.jwt, user_id, &claims.username, TokenKind::Access)
        .map_err(|e| {
            tracing::error!("failed to create token: {:?}", e);
            ApiError::Internal
        })?;

    Ok(Json(RefreshResponse { access_token }))
}
