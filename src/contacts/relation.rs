//! Directed relation records and the rules that reconcile a pair of them.
//!
//! A relationship between two accounts is stored as up to two independent
//! directed records: `(a, b)` and `(b, a)`. Neither row is authoritative on
//! its own; the effective state of the pair is derived from whichever subset
//! of the two exists. The derivation lives in the two pure functions below
//! so the one genuinely subtle piece of logic (incoming-request filtering
//! and the accept guard) can be tested without a store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a single directed relation record.
///
/// Stored as uppercase text. A record moves `PENDING -> ACCEPTED` when the
/// request is accepted (or auto-accepted); `BLOCKED` refuses new requests
/// from the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum RelationStatus {
    Pending,
    Accepted,
    Blocked,
}

/// One directed relation row, owned by `owner_id` and pointing at
/// `target_id`. At most one record exists per ordered pair.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RelationRecord {
    pub owner_id: i64,
    pub target_id: i64,
    pub status: RelationStatus,
    /// Creation time, used for ordering and for the tie-breaking rules.
    pub created_at: DateTime<Utc>,
}

impl RelationRecord {
    /// Build a fresh record stamped with the current time.
    pub fn new(owner_id: i64, target_id: i64, status: RelationStatus) -> Self {
        Self {
            owner_id,
            target_id,
            status,
            created_at: Utc::now(),
        }
    }
}

/// The view of a relationship handed back to callers: the other account
/// plus the status of the relevant directed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactView {
    pub id: i64,
    pub username: String,
    pub status: RelationStatus,
}

/// Decide whether a pending record targeting me is a genuine incoming
/// request.
///
/// `incoming` is the record `(requester -> me)`; `inverse` is my own record
/// `(me -> requester)` if one exists. When both directions are pending (a
/// mirrored pair, typically legacy data), the earlier record belongs to the
/// original requester and the later one is the real incoming request. An
/// incoming record is genuine only when it is strictly older than the
/// inverse; an inverse created at the same instant or earlier suppresses it,
/// because in that case I initiated the request myself.
pub fn is_genuine_incoming(incoming: &RelationRecord, inverse: Option<&RelationRecord>) -> bool {
    match inverse {
        None => true,
        Some(inv) => incoming.created_at < inv.created_at,
    }
}

/// Detect role inversion on accept: the caller trying to accept a request
/// they themselves originated.
///
/// `mine` is the caller's own record `(me -> requester)`; `incoming` is the
/// record being accepted `(requester -> me)`. If my record is pending and
/// strictly predates the incoming one, I was the original requester and only
/// the other side may accept. Equal timestamps do not invert: a mirrored
/// pair created in the same instant can be accepted by either side.
pub fn is_role_inverted(mine: Option<&RelationRecord>, incoming: &RelationRecord) -> bool {
    matches!(
        mine,
        Some(m) if m.status == RelationStatus::Pending && m.created_at < incoming.created_at
    )
}
