//! Identity lookup: resolving caller-supplied account references.
//!
//! The engine never inspects raw strings. The transport layer tags every
//! reference as [`UserRef::ById`] or [`UserRef::ByHandle`] (via
//! [`UserRef::parse`]) and the engine resolves it through the
//! [`IdentityLookup`] trait.

use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::auth::users::{get_user_by_id, get_user_by_username};
use crate::contacts::store::StoreError;

/// Normalize a raw handle: trimmed and lowercased.
pub fn normalize_handle(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// A tagged account reference supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    ById(i64),
    ByHandle(String),
}

impl UserRef {
    /// Tag a raw client-supplied reference. Anything that parses as a
    /// number is an id; everything else is a normalized handle. This is
    /// the transport layer's job; engine code only ever sees the tagged
    /// variant.
    pub fn parse(raw: &str) -> UserRef {
        match raw.trim().parse::<i64>() {
            Ok(id) => UserRef::ById(id),
            Err(_) => UserRef::ByHandle(normalize_handle(raw)),
        }
    }
}

/// A resolved account: stable id plus normalized handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub username: String,
}

/// Resolves account references to stable identities.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    /// Resolve a reference; `Ok(None)` when no such account exists.
    async fn resolve(&self, user: &UserRef) -> Result<Option<Account>, StoreError>;
}

#[async_trait]
impl<L: IdentityLookup + ?Sized> IdentityLookup for std::sync::Arc<L> {
    async fn resolve(&self, user: &UserRef) -> Result<Option<Account>, StoreError> {
        (**self).resolve(user).await
    }
}

/// Identity lookup backed by the users table.
#[derive(Clone)]
pub struct SqlIdentityLookup {
    pool: SqlitePool,
}

impl SqlIdentityLookup {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityLookup for SqlIdentityLookup {
    async fn resolve(&self, user: &UserRef) -> Result<Option<Account>, StoreError> {
        let row = match user {
            UserRef::ById(id) => get_user_by_id(&self.pool, *id).await?,
            UserRef::ByHandle(handle) => get_user_by_username(&self.pool, handle).await?,
        };
        Ok(row.map(|u| Account {
            id: u.id,
            username: u.username,
        }))
    }
}

/// In-memory identity lookup, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryIdentityLookup {
    accounts: Mutex<Vec<Account>>,
}

impl MemoryIdentityLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account and return it.
    pub fn insert(&self, id: i64, username: &str) -> Account {
        let account = Account {
            id,
            username: normalize_handle(username),
        };
        self.accounts.lock().unwrap().push(account.clone());
        account
    }
}

#[async_trait]
impl IdentityLookup for MemoryIdentityLookup {
    async fn resolve(&self, user: &UserRef) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().unwrap();
        let found = match user {
            UserRef::ById(id) => accounts.iter().find(|a| a.id == *id),
            UserRef::ByHandle(handle) => accounts.iter().find(|a| a.username == *handle),
        };
        Ok(found.cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_numeric_as_id() {
        assert_eq!(UserRef::parse("42"), UserRef::ById(42));
        assert_eq!(UserRef::parse(" 7 "), UserRef::ById(7));
    }

    #[test]
    fn parse_handle_normalized() {
        assert_eq!(
            UserRef::parse("  Alice "),
            UserRef::ByHandle("alice".to_string())
        );
        assert_eq!(
            UserRef::parse("bob.smith"),
            UserRef::ByHandle("bob.smith".to_string())
        );
    }

    #[tokio::test]
    async fn memory_lookup_resolves_by_id_and_handle() {
        let lookup = MemoryIdentityLookup::new();
        let alice = lookup.insert(1, "Alice");
        assert_eq!(alice.username, "alice");

        let by_id = lookup.resolve(&UserRef::ById(1)).await.unwrap();
        assert_eq!(by_id, Some(alice.clone()));

        let by_handle = lookup
            .resolve(&UserRef::ByHandle("alice".to_string()))
            .await
            .unwrap();
        assert_eq!(by_handle, Some(alice));

        let missing = lookup.resolve(&UserRef::ById(99)).await.unwrap();
        assert_eq!(missing, None);
    }
}
