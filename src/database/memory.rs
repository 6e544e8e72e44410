//! In-process document store
//!
//! Backs local development and the test suite. All seat operations run under
//! a single write lock.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{collections, contains, dedup_ids, Document, DocumentStore, SeatReservation};
use crate::models::HistoryRecord;
use crate::utils::errors::{EventHubError, Result};

#[derive(Default)]
struct Collection {
    next_seq: u64,
    docs: HashMap<Uuid, (u64, Document)>,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Collection>,
    history: HashMap<Uuid, Vec<HistoryRecord>>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn counter(doc: &Document, field: &str) -> u64 {
    doc.get(field).and_then(Value::as_u64).unwrap_or(0)
}

fn is_deleted(doc: &Document) -> bool {
    doc.get("isDeleted").and_then(Value::as_bool).unwrap_or(false)
}

fn has_free_seat(doc: &Document) -> bool {
    let seats = counter(doc, "seats");
    !is_deleted(doc) && (seats == 0 || counter(doc, "takenSeats") < seats)
}

fn array_field<'a>(doc: &'a mut Document, field: &str) -> Result<&'a mut Vec<Value>> {
    let obj = doc
        .as_object_mut()
        .ok_or_else(|| EventHubError::Storage("document is not an object".to_string()))?;
    let slot = obj
        .entry(field.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if slot.is_null() {
        *slot = Value::Array(Vec::new());
    }
    slot.as_array_mut()
        .ok_or_else(|| EventHubError::Storage(format!("field {} is not an array", field)))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, id: Uuid, doc: Document) -> Result<()> {
        let mut inner = self.inner.write().await;
        let coll = inner.collections.entry(collection.to_string()).or_default();

        if coll.docs.contains_key(&id) {
            return Err(EventHubError::Duplicate(format!("{} {} already exists", collection, id)));
        }

        let seq = coll.next_seq;
        coll.next_seq += 1;
        coll.docs.insert(id, (seq, doc));
        Ok(())
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>> {
        let inner = self.inner.read().await;
        Ok(inner
            .collections
            .get(collection)
            .and_then(|c| c.docs.get(&id))
            .map(|(_, doc)| doc.clone()))
    }

    async fn find(&self, collection: &str, filter: &Document) -> Result<Vec<Document>> {
        let inner = self.inner.read().await;
        let Some(coll) = inner.collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<&(u64, Document)> = coll
            .docs
            .values()
            .filter(|(_, doc)| contains(doc, filter))
            .collect();
        matches.sort_by_key(|(seq, _)| *seq);

        Ok(matches.into_iter().map(|(_, doc)| doc.clone()).collect())
    }

    async fn patch(&self, collection: &str, id: Uuid, fields: Document) -> Result<Option<Document>> {
        let Value::Object(fields) = fields else {
            return Err(EventHubError::Storage("patch must be a JSON object".to_string()));
        };

        let mut inner = self.inner.write().await;
        let Some((_, doc)) = inner
            .collections
            .get_mut(collection)
            .and_then(|c| c.docs.get_mut(&id))
        else {
            return Ok(None);
        };

        let obj = doc
            .as_object_mut()
            .ok_or_else(|| EventHubError::Storage("document is not an object".to_string()))?;
        for (key, value) in fields {
            obj.insert(key, value);
        }

        Ok(Some(doc.clone()))
    }

    async fn add_to_set(&self, collection: &str, id: Uuid, field: &str, value: Document) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let Some((_, doc)) = inner
            .collections
            .get_mut(collection)
            .and_then(|c| c.docs.get_mut(&id))
        else {
            return Ok(false);
        };

        let items = array_field(doc, field)?;
        if items.contains(&value) {
            return Ok(false);
        }
        items.push(value);
        Ok(true)
    }

    async fn pull(&self, collection: &str, id: Uuid, field: &str, value: &Document) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let Some((_, doc)) = inner
            .collections
            .get_mut(collection)
            .and_then(|c| c.docs.get_mut(&id))
        else {
            return Ok(false);
        };

        let items = array_field(doc, field)?;
        let before = items.len();
        items.retain(|item| !contains(item, value));
        Ok(items.len() != before)
    }

    async fn remove(&self, collection: &str, id: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .collections
            .get_mut(collection)
            .and_then(|c| c.docs.remove(&id))
            .is_some())
    }

    async fn reserve_seats(&self, activity_ids: &[Uuid]) -> Result<SeatReservation> {
        let ids = dedup_ids(activity_ids);
        let mut inner = self.inner.write().await;
        let activities = inner
            .collections
            .entry(collections::ACTIVITIES.to_string())
            .or_default();

        if let Some(blocked) = ids.iter().find(|id| {
            !activities
                .docs
                .get(id)
                .is_some_and(|(_, doc)| has_free_seat(doc))
        }) {
            return Ok(SeatReservation::Blocked(*blocked));
        }

        for id in &ids {
            if let Some((_, doc)) = activities.docs.get_mut(id) {
                let taken = counter(doc, "takenSeats") + 1;
                doc["takenSeats"] = Value::from(taken);
            }
        }

        Ok(SeatReservation::Reserved)
    }

    async fn release_seats(&self, activity_ids: &[Uuid]) -> Result<Vec<Uuid>> {
        let ids = dedup_ids(activity_ids);
        let mut inner = self.inner.write().await;
        let Some(activities) = inner.collections.get_mut(collections::ACTIVITIES) else {
            return Ok(Vec::new());
        };

        let mut released = Vec::new();
        for id in ids {
            if let Some((_, doc)) = activities.docs.get_mut(&id) {
                let taken = counter(doc, "takenSeats");
                if taken > 0 {
                    doc["takenSeats"] = Value::from(taken - 1);
                    released.push(id);
                }
            }
        }

        Ok(released)
    }

    async fn set_seats(&self, activity_id: Uuid, seats: u64) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let Some((_, doc)) = inner
            .collections
            .get_mut(collections::ACTIVITIES)
            .and_then(|c| c.docs.get_mut(&activity_id))
        else {
            return Ok(false);
        };

        if is_deleted(doc) || (seats != 0 && counter(doc, "takenSeats") > seats) {
            return Ok(false);
        }
        doc["seats"] = Value::from(seats);
        Ok(true)
    }

    async fn append_history(&self, entity_id: Uuid, record: &HistoryRecord) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.history.entry(entity_id).or_default().push(record.clone());
        Ok(())
    }

    async fn history(&self, entity_id: Uuid, limit: Option<usize>) -> Result<Vec<HistoryRecord>> {
        let inner = self.inner.read().await;
        let records = inner.history.get(&entity_id).map(Vec::as_slice).unwrap_or(&[]);
        let skip = limit.map_or(0, |n| records.len().saturating_sub(n));
        Ok(records[skip..].to_vec())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
