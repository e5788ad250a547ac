//! Contact relationship management.
//!
//! Relationships between accounts are directed: each side owns its own
//! relation record, and a pair of accounts is linked by up to two rows.
//! The engine reconciles whichever subset of the two exists into the
//! familiar symmetric behavior (requests, mutual acceptance, removal).
//!
//! # Module Structure
//!
//! ```text
//! contacts/
//! ├── mod.rs      - Module exports
//! ├── relation.rs - Record types and pure reconciliation rules
//! ├── identity.rs - Account reference resolution
//! ├── store.rs    - Relation store trait + SQLite/in-memory backends
//! ├── engine.rs   - The relationship engine (business rules)
//! └── handlers.rs - HTTP handlers
//! ```

/// Record types and reconciliation rules
pub mod relation;

/// Account reference resolution
pub mod identity;

/// Relation persistence
pub mod store;

/// The relationship engine
pub mod engine;

/// HTTP handlers for contact endpoints
pub mod handlers;

pub use engine::{ContactEngine, ContactError};
pub use identity::{Account, IdentityLookup, SqlIdentityLookup, UserRef};
pub use relation::{ContactView, RelationRecord, RelationStatus};
pub use store::{RelationStore, SqliteRelationStore, StoreError};
