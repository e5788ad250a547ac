/**
 * Authentication Handler Types
 *
 * Request and response types shared by the authentication handlers.
 */

use serde::{Deserialize, Serialize};

/// Registration request
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Desired handle (normalized before validation)
    pub username: String,
    /// Plain password (hashed before storage)
    pub password: String,
}

/// Login request
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Returned by register and login: a token pair plus the normalized handle.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub username: String,
}

/// Optional refresh request body; the token may also arrive in the
/// Authorization header.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Returned by refresh: a fresh access token. The refresh token stays valid
/// and is not rotated.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Returned by `GET /api/auth/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub username: String,
}
