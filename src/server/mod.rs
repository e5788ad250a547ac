//! Server initialization and shared state.
//!
//! ```text
//! server/
//! ├── mod.rs   - Module exports
//! ├── state.rs - AppState and FromRef implementations
//! ├── config.rs - Configuration loading (database, JWT)
//! └── init.rs  - App assembly
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use init::{build_app, create_app};
pub use state::AppState;
