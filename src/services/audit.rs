//! Change history service
//!
//! Stamps audit fields on mutated entities and keeps the append-only
//! history log, which lives beside the entities rather than inside them.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::database::store::DocumentStore;
use crate::models::{AuditFields, ChangeType, HistoryRecord, WithHistory};
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct Auditor {
    store: Arc<dyn DocumentStore>,
    max_history: Option<usize>,
}

impl std::fmt::Debug for Auditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auditor").field("max_history", &self.max_history).finish()
    }
}

impl Auditor {
    /// Create a new Auditor; `max_history` caps what responses embed
    pub fn new(store: Arc<dyn DocumentStore>, max_history: Option<usize>) -> Self {
        Self { store, max_history }
    }

    /// Audit fields to merge into a patch for `change`
    pub fn stamp(&self, actor: Option<Uuid>, change: &ChangeType) -> Result<Value> {
        Ok(serde_json::to_value(AuditFields::stamp(actor, change))?)
    }

    /// `fields` with the audit stamp merged in
    pub fn stamped_patch(&self, fields: Value, actor: Option<Uuid>, change: &ChangeType) -> Result<Value> {
        let mut patch = match fields {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        if let Value::Object(stamp) = self.stamp(actor, change)? {
            patch.extend(stamp);
        }
        Ok(Value::Object(patch))
    }

    /// Append a history record for `entity_id`
    pub async fn record(&self, entity_id: Uuid, actor: Option<Uuid>, change: ChangeType) -> Result<()> {
        debug!(entity_id = %entity_id, change_type = %change, "Recording change");
        self.store
            .append_history(entity_id, &HistoryRecord::new(actor, change))
            .await
    }

    /// History embedded in responses, oldest first
    pub async fn history(&self, entity_id: Uuid) -> Result<Vec<HistoryRecord>> {
        self.store.history(entity_id, self.max_history).await
    }

    /// Wrap `entity` with its history
    pub async fn with_history<T: Serialize>(&self, entity_id: Uuid, entity: T) -> Result<WithHistory<T>> {
        Ok(WithHistory {
            changed_history: self.history(entity_id).await?,
            entity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_record_and_read_back() {
        let auditor = Auditor::new(Arc::new(MemoryStore::new()), Some(2));
        let entity = Uuid::new_v4();
        let actor = Some(Uuid::new_v4());

        auditor.record(entity, actor, ChangeType::Create).await.unwrap();
        auditor.record(entity, actor, ChangeType::custom("add-operator")).await.unwrap();
        auditor.record(entity, actor, ChangeType::Update).await.unwrap();

        let history = auditor.history(entity).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].change_type, ChangeType::custom("add-operator"));
        assert_eq!(history[1].change_type, ChangeType::Update);
    }

    #[test]
    fn test_stamped_patch_uses_category() {
        let auditor = Auditor::new(Arc::new(MemoryStore::new()), None);
        let actor = Uuid::new_v4();
        let patch = auditor
            .stamped_patch(json!({ "title": "New" }), Some(actor), &ChangeType::custom("update-logo"))
            .unwrap();

        assert_eq!(patch["title"], "New");
        assert_eq!(patch["changedType"], "update");
        assert_eq!(patch["changedBy"], json!(actor));
    }
}
