//! HTTP handlers for authentication endpoints.
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Handler exports
//! ├── types.rs    - Request/response types
//! ├── register.rs - Account registration
//! ├── login.rs    - Credential verification
//! ├── refresh.rs  - Access token renewal
//! └── me.rs       - Current user
//! ```

/// Request/response types
pub mod types;

/// Account registration handler
pub mod register;

/// Login handler
pub mod login;

/// Token refresh handler
pub mod refresh;

/// Current user handler
pub mod me;

pub use login::login;
pub use me::get_me;
pub use refresh::refresh;
pub use register::register;
