//! Relation store: durable directed relation records.
//!
//! The store exposes three read primitives plus a single atomic
//! [`RelationStore::apply`] that takes the whole write set of an engine
//! operation. Handing reads and writes to the store as one unit lets any
//! backend (relational, in-memory) provide the required atomicity: either
//! every write in the batch lands or none does.
//!
//! The table's primary key on `(owner_id, target_id)` is the uniqueness
//! backstop for concurrent inserts of the same pair. An [`Insert`] that hits
//! an existing pair fails the entire batch with [`StoreError::Duplicate`];
//! the engine treats that as "record already exists" and falls back to its
//! idempotent path instead of surfacing an error.
//!
//! [`Insert`]: RelationWrite::Insert

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::contacts::relation::{RelationRecord, RelationStatus};

/// Store-level failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An insert hit an existing `(owner, target)` pair.
    #[error("relation already exists")]
    Duplicate,

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One write in an atomic batch.
#[derive(Debug, Clone)]
pub enum RelationWrite {
    /// Create a new record. Fails the batch with [`StoreError::Duplicate`]
    /// if the pair already exists.
    Insert(RelationRecord),
    /// Update the status of an existing record. A missing pair is a no-op.
    SetStatus {
        owner_id: i64,
        target_id: i64,
        status: RelationStatus,
    },
    /// Delete a record if present.
    Delete { owner_id: i64, target_id: i64 },
}

/// Persistence seam for directed relation records.
#[async_trait]
pub trait RelationStore: Send + Sync {
    /// Look up the record for one ordered pair.
    async fn find(&self, owner_id: i64, target_id: i64)
        -> Result<Option<RelationRecord>, StoreError>;

    /// All records owned by `owner_id` with the given status, oldest first.
    async fn list_by_owner(
        &self,
        owner_id: i64,
        status: RelationStatus,
    ) -> Result<Vec<RelationRecord>, StoreError>;

    /// All records pointing at `target_id` with the given status, oldest
    /// first.
    async fn list_by_target(
        &self,
        target_id: i64,
        status: RelationStatus,
    ) -> Result<Vec<RelationRecord>, StoreError>;

    /// Apply a batch of writes atomically. On any failure, including
    /// [`StoreError::Duplicate`], no write in the batch is applied.
    async fn apply(&self, writes: Vec<RelationWrite>) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: RelationStore + ?Sized> RelationStore for std::sync::Arc<S> {
    async fn find(
        &self,
        owner_id: i64,
        target_id: i64,
    ) -> Result<Option<RelationRecord>, StoreError> {
        (**self).find(owner_id, target_id).await
    }

    async fn list_by_owner(
        &self,
        owner_id: i64,
        status: RelationStatus,
    ) -> Result<Vec<RelationRecord>, StoreError> {
        (**self).list_by_owner(owner_id, status).await
    }

    async fn list_by_target(
        &self,
        target_id: i64,
        status: RelationStatus,
    ) -> Result<Vec<RelationRecord>, StoreError> {
        (**self).list_by_target(target_id, status).await
    }

    async fn apply(&self, writes: Vec<RelationWrite>) -> Result<(), StoreError> {
        (**self).apply(writes).await
    }
}

/// Relation store backed by the `contacts` table. Each `apply` runs in one
/// transaction.
#[derive(Clone)]
pub struct SqliteRelationStore {
    pool: SqlitePool,
}

impl SqliteRelationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_insert_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl RelationStore for SqliteRelationStore {
    async fn find(
        &self,
        owner_id: i64,
        target_id: i64,
    ) -> Result<Option<RelationRecord>, StoreError> {
        let record = sqlx::query_as::<_, RelationRecord>(
            "SELECT owner_id, target_id, status, created_at \
             FROM contacts WHERE owner_id = ?1 AND target_id = ?2",
        )
        .bind(owner_id)
        .bind(target_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list_by_owner(
        &self,
        owner_id: i64,
        status: RelationStatus,
    ) -> Result<Vec<RelationRecord>, StoreError> {
        let records = sqlx::query_as::<_, RelationRecord>(
            "SELECT owner_id, target_id, status, created_at \
             FROM contacts WHERE owner_id = ?1 AND status = ?2 \
             ORDER BY created_at ASC",
        )
        .bind(owner_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn list_by_target(
        &self,
        target_id: i64,
        status: RelationStatus,
    ) -> Result<Vec<RelationRecord>, StoreError> {
        let records = sqlx::query_as::<_, RelationRecord>(
            "SELECT owner_id, target_id, status, created_at \
             FROM contacts WHERE target_id = ?1 AND status = ?2 \
             ORDER BY created_at ASC",
        )
        .bind(target_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn apply(&self, writes: Vec<RelationWrite>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for write in writes {
            match write {
                RelationWrite::Insert(record) => {
                    let result = sqlx::query(
                        "INSERT INTO contacts (owner_id, target_id, status, created_at) \
                         VALUES (?1, ?2, ?3, ?4)",
                    )
                    .bind(record.owner_id)
                    .bind(record.target_id)
                    .bind(record.status)
                    .bind(record.created_at)
                    .execute(&mut *tx)
                    .await;
                    if let Err(e) = result {
                        return Err(map_insert_error(e));
                    }
                }
                RelationWrite::SetStatus {
                    owner_id,
                    target_id,
                    status,
                } => {
                    sqlx::query(
                        "UPDATE contacts SET status = ?3 \
                         WHERE owner_id = ?1 AND target_id = ?2",
                    )
                    .bind(owner_id)
                    .bind(target_id)
                    .bind(status)
                    .execute(&mut *tx)
                    .await?;
                }
                RelationWrite::Delete {
                    owner_id,
                    target_id,
                } => {
                    sqlx::query("DELETE FROM contacts WHERE owner_id = ?1 AND target_id = ?2")
                        .bind(owner_id)
                        .bind(target_id)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }
        tx.commit().await?;
        Ok(())
    }
}

/// In-memory relation store, for tests and embedding. Batches are staged
/// against a copy so a failed batch leaves the store untouched.
#[derive(Debug, Default)]
pub struct MemoryRelationStore {
    records: Mutex<HashMap<(i64, i64), RelationRecord>>,
}

impl MemoryRelationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RelationStore for MemoryRelationStore {
    async fn find(
        &self,
        owner_id: i64,
        target_id: i64,
    ) -> Result<Option<RelationRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records.get(&(owner_id, target_id)).cloned())
    }

    async fn list_by_owner(
        &self,
        owner_id: i64,
        status: RelationStatus,
    ) -> Result<Vec<RelationRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        let mut found: Vec<RelationRecord> = records
            .values()
            .filter(|r| r.owner_id == owner_id && r.status == status)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.created_at);
        Ok(found)
    }

    async fn list_by_target(
        &self,
        target_id: i64,
        status: RelationStatus,
    ) -> Result<Vec<RelationRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        let mut found: Vec<RelationRecord> = records
            .values()
            .filter(|r| r.target_id == target_id && r.status == status)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.created_at);
        Ok(found)
    }

    async fn apply(&self, writes: Vec<RelationWrite>) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let mut staged = records.clone();
        for write in &writes {
            match write {
                RelationWrite::Insert(record) => {
                    let key = (record.owner_id, record.target_id);
                    if staged.contains_key(&key) {
                        return Err(StoreError::Duplicate);
                    }
                    staged.insert(key, record.clone());
                }
                RelationWrite::SetStatus {
                    owner_id,
                    target_id,
                    status,
                } => {
                    if let Some(record) = staged.get_mut(&(*owner_id, *target_id)) {
                        record.status = *status;
                    }
                }
                RelationWrite::Delete {
                    owner_id,
                    target_id,
                } => {
                    staged.remove(&(*owner_id, *target_id));
                }
            }
        }
        *records = staged;
        Ok(())
    }
}
