/**
 * API Error Types
 *
 * This module defines the error type used by HTTP handlers. Every variant
 * maps to a fixed HTTP status code; the response body carries the error
 * message as JSON (see `conversion.rs`).
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::contacts::engine::ContactError;
use crate::contacts::store::StoreError;

/// Errors surfaced by the HTTP API.
///
/// Domain errors from the contact engine convert into the matching variant
/// via `From<ContactError>`; database errors pass through unmodified and are
/// never retried.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No caller identity available (missing, malformed, or expired token).
    #[error("unauthenticated")]
    Unauthenticated,

    /// Login with a username/password pair that does not check out.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Refresh attempted without a usable refresh token.
    #[error("invalid refresh token")]
    InvalidRefreshToken,

    /// The caller is known but not allowed to perform the operation.
    #[error("{0}")]
    Forbidden(String),

    /// A referenced account does not resolve.
    #[error("{0}")]
    NotFound(String),

    /// The request is well-formed but the operation is not valid.
    #[error("{0}")]
    Invalid(String),

    /// The operation conflicts with existing state (e.g. taken username).
    #[error("{0}")]
    Conflict(String),

    /// Database failure. The detail is logged at the call site, not leaked.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Anything else that should read as a 500.
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Human-readable error message for the response body.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<ContactError> for ApiError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::NotFound => Self::NotFound("user not found".to_string()),
            ContactError::InvalidOperation(msg) => Self::Invalid(msg.to_string()),
            ContactError::Forbidden(msg) => Self::Forbidden(msg.to_string()),
            ContactError::Store(StoreError::Duplicate) => {
                Self::Conflict("relation already exists".to_string())
            }
            ContactError::Store(StoreError::Database(e)) => Self::Database(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(ApiError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Forbidden("no".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("user not found".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Invalid("cannot add yourself".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("username already taken".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError::Internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_contact_error_conversion() {
        let err: ApiError = ContactError::NotFound.into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "user not found");

        let err: ApiError = ContactError::InvalidOperation("cannot add yourself").into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "cannot add yourself");

        let err: ApiError = ContactError::Forbidden("cannot add contact: blocked").into();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_database_error_message_is_generic() {
        let err = ApiError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.message(), "database error");
    }
}
