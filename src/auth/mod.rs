//! Authentication: accounts, password verification, and JWT sessions.
//!
//! # Authentication Flow
//!
//! 1. **Register**: handle + password -> account created -> token pair
//! 2. **Login**: handle + password verified -> token pair
//! 3. **Refresh**: valid refresh token -> new access token
//! 4. **Me**: valid access token -> caller's handle
//!
//! Passwords are hashed with bcrypt before storage. Access tokens are
//! short-lived; refresh tokens only mint new access tokens and are never
//! accepted on protected routes.

/// Account rows and database operations
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::types::{AuthResponse, LoginRequest, RegisterRequest};
pub use handlers::{get_me, login, refresh, register};
pub use sessions::{JwtConfig, TokenKind};
