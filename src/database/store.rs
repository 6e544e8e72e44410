//! Document store abstraction
//!
//! Every entity lives in a named collection of JSON documents keyed by UUID.
//! Backends implement [`DocumentStore`]; typed access goes through the
//! repositories.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::models::HistoryRecord;
use crate::utils::errors::Result;

pub type Document = Value;

/// Collection names
pub mod collections {
    pub const USERS: &str = "users";
    pub const EVENTS: &str = "events";
    pub const ACTIVITIES: &str = "activities";
    pub const TICKETS: &str = "tickets";
    pub const CALIFICATIONS: &str = "califications";
    pub const WITNESSES: &str = "witnesses";
    pub const FILES: &str = "files";
    pub const MAIN_CONFIG: &str = "main_config";
}

/// Outcome of an all-or-nothing seat reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatReservation {
    Reserved,
    /// Nothing was changed; this activity is full, missing or deleted
    Blocked(Uuid),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document. Fails with `Duplicate` if the id is taken.
    async fn insert(&self, collection: &str, id: Uuid, doc: Document) -> Result<()>;

    /// Raw lookup, soft-deleted documents included
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>>;

    /// Documents containing `filter`, in insertion order
    async fn find(&self, collection: &str, filter: &Document) -> Result<Vec<Document>>;

    /// Shallow merge of top-level fields. Returns the updated document.
    async fn patch(&self, collection: &str, id: Uuid, fields: Document) -> Result<Option<Document>>;

    /// Append `value` to the array `field` unless already present. Returns
    /// whether the document changed.
    async fn add_to_set(&self, collection: &str, id: Uuid, field: &str, value: Document) -> Result<bool>;

    /// Remove every element of the array `field` that contains `value`
    async fn pull(&self, collection: &str, id: Uuid, field: &str, value: &Document) -> Result<bool>;

    /// Hard delete
    async fn remove(&self, collection: &str, id: Uuid) -> Result<bool>;

    /// Increment `takenSeats` on every listed activity, or on none of them
    async fn reserve_seats(&self, activity_ids: &[Uuid]) -> Result<SeatReservation>;

    /// Decrement `takenSeats` where it is above zero. Returns the ids decremented.
    async fn release_seats(&self, activity_ids: &[Uuid]) -> Result<Vec<Uuid>>;

    /// Set the capacity of an active activity unless that would leave more
    /// seats taken than available. A capacity of 0 always applies.
    async fn set_seats(&self, activity_id: Uuid, seats: u64) -> Result<bool>;

    async fn append_history(&self, entity_id: Uuid, record: &HistoryRecord) -> Result<()>;

    /// Change log, oldest first. `limit` keeps only the most recent records.
    async fn history(&self, entity_id: Uuid, limit: Option<usize>) -> Result<Vec<HistoryRecord>>;

    async fn ping(&self) -> Result<()>;
}

/// JSON containment with the semantics of Postgres `@>`: objects match
/// key-wise, arrays match when every filter element is contained in some
/// document element, scalars by equality.
pub fn contains(doc: &Value, filter: &Value) -> bool {
    match (doc, filter) {
        (Value::Object(d), Value::Object(f)) => f
            .iter()
            .all(|(key, fv)| d.get(key).is_some_and(|dv| contains(dv, fv))),
        (Value::Array(d), Value::Array(f)) => f.iter().all(|fv| d.iter().any(|dv| contains(dv, fv))),
        _ => doc == filter,
    }
}

/// Remove duplicate ids, keeping first-seen order
pub fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
