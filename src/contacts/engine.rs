//! The contact relationship engine.
//!
//! Business rules over the relation store: add, accept, remove, list, and
//! list-incoming. Every operation enters with a pre-resolved caller
//! identity, reads zero, one, or two directed records for the pair, applies
//! the rules below, writes zero to two records as one atomic batch, and
//! returns a [`ContactView`].
//!
//! The data model is deliberately asymmetric (one row per direction), so
//! the symmetric-looking behavior comes entirely from reconciliation here:
//!
//! - adding when the other side already has a pending request collapses
//!   the mutual request into acceptance without an explicit accept step;
//! - adding when the other side already accepted repairs the missing own
//!   row (self-healing asymmetry);
//! - a repeated add returns the existing record unchanged;
//! - a concurrent insert of the same pair surfaces from the store as
//!   [`StoreError::Duplicate`] and is folded back into the idempotent
//!   result instead of failing the call.

use thiserror::Error;

use crate::contacts::identity::{Account, IdentityLookup, UserRef};
use crate::contacts::relation::{
    is_genuine_incoming, is_role_inverted, ContactView, RelationRecord, RelationStatus,
};
use crate::contacts::store::{RelationStore, RelationWrite, StoreError};

/// Errors surfaced by engine operations. Never retried internally; the
/// idempotency of `add_contact` and `remove` is what makes caller-side
/// retries safe.
#[derive(Debug, Error)]
pub enum ContactError {
    /// The referenced account does not resolve.
    #[error("user not found")]
    NotFound,

    /// The operation is not valid in the current state.
    #[error("{0}")]
    InvalidOperation(&'static str),

    /// The caller may not perform this operation.
    #[error("{0}")]
    Forbidden(&'static str),

    /// Store failure, surfaced unmodified.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The relationship engine. Depends only on an [`IdentityLookup`] and a
/// [`RelationStore`]; no other component touches relation records.
#[derive(Clone)]
pub struct ContactEngine<I, S> {
    identity: I,
    store: S,
}

impl<I: IdentityLookup, S: RelationStore> ContactEngine<I, S> {
    pub fn new(identity: I, store: S) -> Self {
        Self { identity, store }
    }

    /// All accepted contacts owned by `me`.
    pub async fn list_contacts(&self, me: &Account) -> Result<Vec<ContactView>, ContactError> {
        let records = self
            .store
            .list_by_owner(me.id, RelationStatus::Accepted)
            .await?;
        self.to_views(records.iter().map(|r| (r.target_id, r.status)))
            .await
    }

    /// Genuine pending requests targeting `me`.
    ///
    /// A pending record `(requester -> me)` is excluded when my own record
    /// `(me -> requester)` exists and was created at or before it: in that
    /// case I am the original requester and the mirrored reverse row would
    /// otherwise falsely look like an incoming request.
    pub async fn incoming_requests(&self, me: &Account) -> Result<Vec<ContactView>, ContactError> {
        let records = self
            .store
            .list_by_target(me.id, RelationStatus::Pending)
            .await?;
        let mut genuine = Vec::with_capacity(records.len());
        for record in records {
            let inverse = self.store.find(me.id, record.owner_id).await?;
            if is_genuine_incoming(&record, inverse.as_ref()) {
                genuine.push((record.owner_id, record.status));
            }
        }
        self.to_views(genuine.into_iter()).await
    }

    /// Request (or re-request) a contact.
    ///
    /// Repeating an existing request returns the existing record unchanged.
    /// When the reverse direction is already pending, both directions are
    /// accepted in one batch; when it is already accepted, the missing own
    /// row is created as accepted; when it is blocked, the call fails with
    /// [`ContactError::Forbidden`]. Otherwise only the caller's outbound
    /// edge is created as pending; the reverse direction is not created
    /// until the recipient acts.
    pub async fn add_contact(
        &self,
        me: &Account,
        target: &UserRef,
    ) -> Result<ContactView, ContactError> {
        let target = self
            .identity
            .resolve(target)
            .await?
            .ok_or(ContactError::NotFound)?;
        if target.id == me.id {
            return Err(ContactError::InvalidOperation("cannot add yourself"));
        }

        if let Some(existing) = self.store.find(me.id, target.id).await? {
            return Ok(view(&target, existing.status));
        }

        let reverse = self.store.find(target.id, me.id).await?;
        match reverse.map(|r| r.status) {
            Some(RelationStatus::Pending) => {
                // Mutual request: accept both directions in one batch.
                let writes = vec![
                    RelationWrite::Insert(RelationRecord::new(
                        me.id,
                        target.id,
                        RelationStatus::Accepted,
                    )),
                    RelationWrite::SetStatus {
                        owner_id: target.id,
                        target_id: me.id,
                        status: RelationStatus::Accepted,
                    },
                ];
                match self.store.apply(writes).await {
                    Ok(()) => {
                        tracing::debug!(me = me.id, target = target.id, "mutual request accepted");
                        Ok(view(&target, RelationStatus::Accepted))
                    }
                    Err(StoreError::Duplicate) => self.existing_view(me, &target).await,
                    Err(e) => Err(e.into()),
                }
            }
            Some(RelationStatus::Accepted) => {
                // The other side already accepted; repair the missing row.
                let writes = vec![RelationWrite::Insert(RelationRecord::new(
                    me.id,
                    target.id,
                    RelationStatus::Accepted,
                ))];
                match self.store.apply(writes).await {
                    Ok(()) => Ok(view(&target, RelationStatus::Accepted)),
                    Err(StoreError::Duplicate) => self.existing_view(me, &target).await,
                    Err(e) => Err(e.into()),
                }
            }
            Some(RelationStatus::Blocked) => {
                Err(ContactError::Forbidden("cannot add contact: blocked"))
            }
            None => {
                let writes = vec![RelationWrite::Insert(RelationRecord::new(
                    me.id,
                    target.id,
                    RelationStatus::Pending,
                ))];
                match self.store.apply(writes).await {
                    Ok(()) => {
                        tracing::debug!(me = me.id, target = target.id, "contact requested");
                        Ok(view(&target, RelationStatus::Pending))
                    }
                    Err(StoreError::Duplicate) => self.existing_view(me, &target).await,
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    /// Accept a pending request from `requester`.
    ///
    /// Requires `(requester -> me)` to exist and be pending. If my own
    /// record exists, is pending, and strictly predates the incoming one, I
    /// originated the request and may not accept it myself. Both directions
    /// are written as one atomic batch.
    pub async fn accept(
        &self,
        me: &Account,
        requester: &UserRef,
    ) -> Result<ContactView, ContactError> {
        let requester = self
            .identity
            .resolve(requester)
            .await?
            .ok_or(ContactError::NotFound)?;

        let incoming = self
            .store
            .find(requester.id, me.id)
            .await?
            .ok_or(ContactError::InvalidOperation("no request found"))?;
        if incoming.status != RelationStatus::Pending {
            return Err(ContactError::InvalidOperation("no pending request to accept"));
        }

        let mine = self.store.find(me.id, requester.id).await?;
        if is_role_inverted(mine.as_ref(), &incoming) {
            return Err(ContactError::Forbidden(
                "only the recipient can accept this request",
            ));
        }

        let mut writes = vec![RelationWrite::SetStatus {
            owner_id: requester.id,
            target_id: me.id,
            status: RelationStatus::Accepted,
        }];
        match mine {
            Some(_) => writes.push(RelationWrite::SetStatus {
                owner_id: me.id,
                target_id: requester.id,
                status: RelationStatus::Accepted,
            }),
            None => writes.push(RelationWrite::Insert(RelationRecord::new(
                me.id,
                requester.id,
                RelationStatus::Accepted,
            ))),
        }
        match self.store.apply(writes).await {
            Ok(()) => {}
            Err(StoreError::Duplicate) => {
                // My row appeared concurrently; flip both in place instead.
                self.store
                    .apply(vec![
                        RelationWrite::SetStatus {
                            owner_id: requester.id,
                            target_id: me.id,
                            status: RelationStatus::Accepted,
                        },
                        RelationWrite::SetStatus {
                            owner_id: me.id,
                            target_id: requester.id,
                            status: RelationStatus::Accepted,
                        },
                    ])
                    .await?;
            }
            Err(e) => return Err(e.into()),
        }
        tracing::debug!(me = me.id, requester = requester.id, "request accepted");
        Ok(view(&requester, RelationStatus::Accepted))
    }

    /// Delete both directions of the relationship with `other`, if present.
    /// An unresolvable reference and a missing relationship are both silent
    /// no-ops; deletion is inherently idempotent.
    pub async fn remove(&self, me: &Account, other: &UserRef) -> Result<(), ContactError> {
        let Some(other) = self.identity.resolve(other).await? else {
            return Ok(());
        };
        self.store
            .apply(vec![
                RelationWrite::Delete {
                    owner_id: me.id,
                    target_id: other.id,
                },
                RelationWrite::Delete {
                    owner_id: other.id,
                    target_id: me.id,
                },
            ])
            .await?;
        tracing::debug!(me = me.id, other = other.id, "contact removed");
        Ok(())
    }

    /// Idempotent fallback after a duplicate-insert race: return whatever
    /// record `(me -> target)` now holds.
    async fn existing_view(
        &self,
        me: &Account,
        target: &Account,
    ) -> Result<ContactView, ContactError> {
        let record = self
            .store
            .find(me.id, target.id)
            .await?
            .ok_or(StoreError::Duplicate)?;
        Ok(view(target, record.status))
    }

    async fn to_views(
        &self,
        pairs: impl Iterator<Item = (i64, RelationStatus)>,
    ) -> Result<Vec<ContactView>, ContactError> {
        let mut views = Vec::new();
        for (account_id, status) in pairs {
            match self.identity.resolve(&UserRef::ById(account_id)).await? {
                Some(account) => views.push(view(&account, status)),
                None => {
                    tracing::warn!(account_id, "relation points at unknown account");
                }
            }
        }
        Ok(views)
    }
}

fn view(account: &Account, status: RelationStatus) -> ContactView {
    ContactView {
        id: account.id,
        username: account.username.clone(),
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::identity::MemoryIdentityLookup;
    use crate::contacts::store::MemoryRelationStore;
    use assert_matches::assert_matches;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Arc;

    type TestEngine = ContactEngine<Arc<MemoryIdentityLookup>, Arc<MemoryRelationStore>>;

    struct Fixture {
        engine: TestEngine,
        store: Arc<MemoryRelationStore>,
        alice: Account,
        bob: Account,
    }

    fn fixture() -> Fixture {
        let identity = Arc::new(MemoryIdentityLookup::new());
        let alice = identity.insert(1, "alice");
        let bob = identity.insert(2, "bob");
        let store = Arc::new(MemoryRelationStore::new());
        let engine = ContactEngine::new(identity, store.clone());
        Fixture {
            engine,
            store,
            alice,
            bob,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    async fn seed(
        store: &MemoryRelationStore,
        owner: i64,
        target: i64,
        status: RelationStatus,
        secs: i64,
    ) {
        store
            .apply(vec![RelationWrite::Insert(RelationRecord {
                owner_id: owner,
                target_id: target,
                status,
                created_at: at(secs),
            })])
            .await
            .unwrap();
    }

    fn by_handle(handle: &str) -> UserRef {
        UserRef::ByHandle(handle.to_string())
    }

    #[tokio::test]
    async fn add_creates_pending_outbound_edge_only() {
        let f = fixture();
        let result = f.engine.add_contact(&f.alice, &by_handle("bob")).await.unwrap();
        assert_eq!(result.id, f.bob.id);
        assert_eq!(result.status, RelationStatus::Pending);

        assert!(f.store.find(1, 2).await.unwrap().is_some());
        assert!(f.store.find(2, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn add_is_idempotent() {
        let f = fixture();
        let first = f.engine.add_contact(&f.alice, &by_handle("bob")).await.unwrap();
        let second = f.engine.add_contact(&f.alice, &by_handle("bob")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(second.status, RelationStatus::Pending);
    }

    #[tokio::test]
    async fn add_resolves_by_numeric_id() {
        let f = fixture();
        let result = f.engine.add_contact(&f.alice, &UserRef::ById(2)).await.unwrap();
        assert_eq!(result.username, "bob");
    }

    #[tokio::test]
    async fn add_self_is_rejected() {
        let f = fixture();
        let result = f.engine.add_contact(&f.alice, &by_handle("alice")).await;
        assert_matches!(result, Err(ContactError::InvalidOperation(_)));
    }

    #[tokio::test]
    async fn add_unknown_target_is_not_found() {
        let f = fixture();
        let result = f.engine.add_contact(&f.alice, &by_handle("nobody")).await;
        assert_matches!(result, Err(ContactError::NotFound));
    }

    #[tokio::test]
    async fn mutual_add_collapses_to_accepted() {
        let f = fixture();
        f.engine.add_contact(&f.alice, &by_handle("bob")).await.unwrap();
        let result = f.engine.add_contact(&f.bob, &by_handle("alice")).await.unwrap();
        assert_eq!(result.id, f.alice.id);
        assert_eq!(result.status, RelationStatus::Accepted);

        let ab = f.store.find(1, 2).await.unwrap().unwrap();
        let ba = f.store.find(2, 1).await.unwrap().unwrap();
        assert_eq!(ab.status, RelationStatus::Accepted);
        assert_eq!(ba.status, RelationStatus::Accepted);
    }

    #[tokio::test]
    async fn add_repairs_missing_row_when_reverse_accepted() {
        let f = fixture();
        seed(&f.store, 2, 1, RelationStatus::Accepted, 0).await;

        let result = f.engine.add_contact(&f.alice, &by_handle("bob")).await.unwrap();
        assert_eq!(result.status, RelationStatus::Accepted);
        assert_eq!(
            f.store.find(1, 2).await.unwrap().unwrap().status,
            RelationStatus::Accepted
        );
    }

    #[tokio::test]
    async fn add_against_blocking_side_is_forbidden() {
        let f = fixture();
        seed(&f.store, 2, 1, RelationStatus::Blocked, 0).await;

        let result = f.engine.add_contact(&f.alice, &by_handle("bob")).await;
        assert_matches!(result, Err(ContactError::Forbidden(_)));
        assert!(f.store.find(1, 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn accept_flips_incoming_and_creates_own_row() {
        let f = fixture();
        f.engine.add_contact(&f.alice, &by_handle("bob")).await.unwrap();

        let result = f.engine.accept(&f.bob, &by_handle("alice")).await.unwrap();
        assert_eq!(result.id, f.alice.id);
        assert_eq!(result.status, RelationStatus::Accepted);

        assert_eq!(
            f.store.find(1, 2).await.unwrap().unwrap().status,
            RelationStatus::Accepted
        );
        assert_eq!(
            f.store.find(2, 1).await.unwrap().unwrap().status,
            RelationStatus::Accepted
        );
    }

    #[tokio::test]
    async fn accept_without_request_is_invalid() {
        let f = fixture();
        let result = f.engine.accept(&f.bob, &by_handle("alice")).await;
        assert_matches!(
            result,
            Err(ContactError::InvalidOperation("no request found"))
        );
    }

    #[tokio::test]
    async fn accept_non_pending_request_is_invalid() {
        let f = fixture();
        seed(&f.store, 1, 2, RelationStatus::Accepted, 0).await;

        let result = f.engine.accept(&f.bob, &by_handle("alice")).await;
        assert_matches!(
            result,
            Err(ContactError::InvalidOperation("no pending request to accept"))
        );
    }

    #[tokio::test]
    async fn accept_by_original_requester_is_forbidden() {
        // Mirrored pending pair with alice's record older: alice is the
        // original requester and may not accept her own request.
        let f = fixture();
        seed(&f.store, 1, 2, RelationStatus::Pending, 0).await;
        seed(&f.store, 2, 1, RelationStatus::Pending, 10).await;

        let result = f.engine.accept(&f.alice, &by_handle("bob")).await;
        assert_matches!(result, Err(ContactError::Forbidden(_)));

        // The recipient can.
        let result = f.engine.accept(&f.bob, &by_handle("alice")).await.unwrap();
        assert_eq!(result.status, RelationStatus::Accepted);
        assert_eq!(
            f.store.find(1, 2).await.unwrap().unwrap().status,
            RelationStatus::Accepted
        );
        assert_eq!(
            f.store.find(2, 1).await.unwrap().unwrap().status,
            RelationStatus::Accepted
        );
    }

    #[tokio::test]
    async fn accept_unknown_requester_is_not_found() {
        let f = fixture();
        let result = f.engine.accept(&f.bob, &by_handle("nobody")).await;
        assert_matches!(result, Err(ContactError::NotFound));
    }

    #[tokio::test]
    async fn incoming_requests_lists_genuine_requests_only() {
        // Mirrored pending pair, alice's record first: only bob has a
        // genuine incoming request.
        let f = fixture();
        seed(&f.store, 1, 2, RelationStatus::Pending, 0).await;
        seed(&f.store, 2, 1, RelationStatus::Pending, 10).await;

        let for_alice = f.engine.incoming_requests(&f.alice).await.unwrap();
        assert!(for_alice.is_empty());

        let for_bob = f.engine.incoming_requests(&f.bob).await.unwrap();
        assert_eq!(for_bob.len(), 1);
        assert_eq!(for_bob[0].username, "alice");
        assert_eq!(for_bob[0].status, RelationStatus::Pending);
    }

    #[tokio::test]
    async fn incoming_requests_equal_timestamps_suppress_both() {
        let f = fixture();
        seed(&f.store, 1, 2, RelationStatus::Pending, 0).await;
        seed(&f.store, 2, 1, RelationStatus::Pending, 0).await;

        assert!(f.engine.incoming_requests(&f.alice).await.unwrap().is_empty());
        assert!(f.engine.incoming_requests(&f.bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn incoming_requests_simple_case() {
        let f = fixture();
        f.engine.add_contact(&f.alice, &by_handle("bob")).await.unwrap();

        let for_bob = f.engine.incoming_requests(&f.bob).await.unwrap();
        assert_eq!(for_bob.len(), 1);
        assert_eq!(for_bob[0].id, f.alice.id);

        let for_alice = f.engine.incoming_requests(&f.alice).await.unwrap();
        assert!(for_alice.is_empty());
    }

    #[tokio::test]
    async fn list_contacts_shows_accepted_both_sides() {
        let f = fixture();
        f.engine.add_contact(&f.alice, &by_handle("bob")).await.unwrap();
        f.engine.accept(&f.bob, &by_handle("alice")).await.unwrap();

        let alices = f.engine.list_contacts(&f.alice).await.unwrap();
        assert_eq!(alices.len(), 1);
        assert_eq!(alices[0].username, "bob");
        assert_eq!(alices[0].status, RelationStatus::Accepted);

        let bobs = f.engine.list_contacts(&f.bob).await.unwrap();
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].username, "alice");
    }

    #[tokio::test]
    async fn list_contacts_excludes_pending() {
        let f = fixture();
        f.engine.add_contact(&f.alice, &by_handle("bob")).await.unwrap();
        assert!(f.engine.list_contacts(&f.alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_deletes_both_directions_and_is_idempotent() {
        let f = fixture();
        f.engine.add_contact(&f.alice, &by_handle("bob")).await.unwrap();
        f.engine.accept(&f.bob, &by_handle("alice")).await.unwrap();

        f.engine.remove(&f.alice, &by_handle("bob")).await.unwrap();
        assert!(f.store.find(1, 2).await.unwrap().is_none());
        assert!(f.store.find(2, 1).await.unwrap().is_none());

        f.engine.remove(&f.alice, &by_handle("bob")).await.unwrap();
    }

    #[tokio::test]
    async fn remove_unknown_user_is_silent() {
        let f = fixture();
        f.engine.remove(&f.alice, &by_handle("nobody")).await.unwrap();
    }

    /// Store wrapper that sneaks a competing insert in just before the
    /// engine's own batch, simulating a lost race on the same pair.
    struct RacingStore {
        inner: Arc<MemoryRelationStore>,
        inject: std::sync::Mutex<Option<RelationRecord>>,
    }

    #[async_trait::async_trait]
    impl RelationStore for RacingStore {
        async fn find(
            &self,
            owner_id: i64,
            target_id: i64,
        ) -> Result<Option<RelationRecord>, StoreError> {
            self.inner.find(owner_id, target_id).await
        }

        async fn list_by_owner(
            &self,
            owner_id: i64,
            status: RelationStatus,
        ) -> Result<Vec<RelationRecord>, StoreError> {
            self.inner.list_by_owner(owner_id, status).await
        }

        async fn list_by_target(
            &self,
            target_id: i64,
            status: RelationStatus,
        ) -> Result<Vec<RelationRecord>, StoreError> {
            self.inner.list_by_target(target_id, status).await
        }

        async fn apply(&self, writes: Vec<RelationWrite>) -> Result<(), StoreError> {
            let injected = self.inject.lock().unwrap().take();
            if let Some(record) = injected {
                self.inner
                    .apply(vec![RelationWrite::Insert(record)])
                    .await?;
            }
            self.inner.apply(writes).await
        }
    }

    #[tokio::test]
    async fn concurrent_insert_falls_back_to_idempotent_result() {
        let identity = Arc::new(MemoryIdentityLookup::new());
        let alice = identity.insert(1, "alice");
        identity.insert(2, "bob");
        let inner = Arc::new(MemoryRelationStore::new());
        let racing = RacingStore {
            inner: inner.clone(),
            inject: std::sync::Mutex::new(Some(RelationRecord {
                owner_id: 1,
                target_id: 2,
                status: RelationStatus::Pending,
                created_at: at(0),
            })),
        };
        let engine = ContactEngine::new(identity, racing);

        // The engine sees no record, tries to insert, loses the race, and
        // returns the competing record instead of an error.
        let result = engine.add_contact(&alice, &by_handle("bob")).await.unwrap();
        assert_eq!(result.status, RelationStatus::Pending);
        assert_eq!(
            inner.find(1, 2).await.unwrap().unwrap().created_at,
            at(0)
        );
    }
}
