/**
 * Session Management and JWT Tokens
 *
 * This module handles JWT token generation and validation. Two token kinds
 * are issued: short-lived access tokens for API calls and long-lived
 * refresh tokens that can only mint new access tokens. A token of one kind
 * is never accepted where the other is required.
 */

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Which kind of token a set of claims belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: String,
    /// Normalized handle
    pub username: String,
    /// Token kind (access or refresh)
    pub kind: TokenKind,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

impl Claims {
    /// Account id from the `sub` claim.
    pub fn user_id(&self) -> Result<i64, std::num::ParseIntError> {
        self.sub.parse()
    }
}

/// JWT signing configuration, loaded from the environment at startup.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}

impl JwtConfig {
    fn ttl_for(&self, kind: TokenKind) -> u64 {
        match kind {
            TokenKind::Access => self.access_ttl_secs,
            TokenKind::Refresh => self.refresh_ttl_secs,
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Create a JWT token for a user
///
/// # Arguments
/// * `config` - Signing secret and TTLs
/// * `user_id` - Account id
/// * `username` - Normalized handle
/// * `kind` - Access or refresh
///
/// # Returns
/// JWT token string
pub fn create_token(
    config: &JwtConfig,
    user_id: i64,
    username: &str,
    kind: TokenKind,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = unix_now();
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        kind,
        exp: now + config.ttl_for(kind),
        iat: now,
    };

    let key = EncodingKey::from_secret(config.secret.as_ref());
    encode(&Header::default(), &claims, &key)
}

/// Verify and decode a JWT token
///
/// Rejects expired tokens, bad signatures, and tokens of the wrong kind.
pub fn verify_token(
    config: &JwtConfig,
    token: &str,
    expected: TokenKind,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(config.secret.as_ref());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &key, &validation)?;
    if token_data.claims.kind != expected {
        return Err(jsonwebtoken::errors::ErrorKind::InvalidToken.into());
    }
    Ok(token_data.claims)
}
