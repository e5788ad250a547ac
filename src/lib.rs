//! Shoal - Main Library
//!
//! Shoal is a small social-messaging backend built with Rust. It manages
//! accounts, contact relationships, and room-scoped chat history behind an
//! Axum REST API.
//!
//! # Overview
//!
//! - JWT-based authentication with access and refresh tokens
//! - A directed-edge contact engine: friend requests, mutual acceptance,
//!   and removal derived from per-direction relation records
//! - Persistent chat rooms with bounded message history
//! - SQLite persistence via sqlx
//!
//! # Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs       - Module exports
//! ├── main.rs      - Server binary
//! ├── server/      - Initialization, state, configuration
//! ├── routes/      - Route configuration
//! ├── auth/        - Accounts, passwords, JWT sessions
//! ├── middleware/  - Request authentication
//! ├── contacts/    - The contact relationship engine
//! ├── chat/        - Rooms and message history
//! └── error/       - API error types
//! ```

/// Accounts, passwords, and JWT sessions
pub mod auth;

/// Chat rooms and message history
pub mod chat;

/// The contact relationship engine
pub mod contacts;

/// API error types
pub mod error;

/// Request processing middleware
pub mod middleware;

/// Route configuration
pub mod routes;

/// Server setup and configuration
pub mod server;

pub use error::ApiError;
pub use server::{build_app, create_app};
