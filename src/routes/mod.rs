//! HTTP route configuration.
//!
//! ```text
//! routes/
//! ├── mod.rs        - Module exports
//! ├── router.rs     - Router assembly (middleware, CORS, fallback)
//! └── api_routes.rs - Endpoint tables
//! ```

/// Endpoint tables
pub mod api_routes;

/// Router assembly
pub mod router;

pub use router::create_router;
