/**
 * Authentication Middleware
 *
 * This module provides middleware for protecting routes that require a
 * caller identity. It extracts and verifies the bearer access token from
 * the Authorization header, loads the account row, and attaches the caller
 * to request extensions for handlers to extract.
 */

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::sessions::{verify_token, TokenKind};
use crate::auth::users::get_user_by_id;
use crate::contacts::identity::Account;
use crate::error::ApiError;
use crate::server::state::AppState;

/// Authenticated caller extracted from the access token.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
}

impl AuthenticatedUser {
    /// The caller as an [`Account`], the shape the contact engine takes.
    pub fn account(&self) -> Account {
        Account {
            id: self.user_id,
            username: self.username.clone(),
        }
    }
}

/// Authentication middleware
///
/// 1. Extracts the bearer token from the Authorization header
/// 2. Verifies it as an access token
/// 3. Loads the account row (the token may outlive the account)
/// 4. Attaches [`AuthenticatedUser`] to request extensions
///
/// Returns 401 Unauthorized if any step fails.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("missing Authorization header");
            ApiError::Unauthenticated
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::warn!("malformed Authorization header");
        ApiError::Unauthenticated
    })?;

    let claims = verify_token(&state.jwt, token, TokenKind::Access).map_err(|e| {
        tracing::warn!("invalid access token: {:?}", e);
        ApiError::Unauthenticated
    })?;

    let user_id = claims.user_id().map_err(|e| {
        tracing::error!("invalid account id in token: {:?}", e);
        ApiError::Unauthenticated
    })?;

    let user = get_user_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(user_id, "token for deleted account");
            ApiError::Unauthenticated
        })?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: user.id,
        username: user.username,
    });

    Ok(next.run(request).await)
}

/// Axum extractor for the authenticated caller.
///
/// Usable as a handler parameter on any route behind [`auth_middleware`].
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl axum::extract::FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                ApiError::Unauthenticated
            })?;

        Ok(AuthUser(user))
    }
}
