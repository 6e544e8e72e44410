//! Calification repository implementation

use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::Collection;
use crate::database::store::{collections, DocumentStore};
use crate::models::calification::Calification;
use crate::models::target::TargetRef;
use crate::utils::errors::Result;

#[derive(Clone, Debug)]
pub struct CalificationRepository {
    docs: Collection<Calification>,
}

impl CalificationRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            docs: Collection::new(store, collections::CALIFICATIONS),
        }
    }

    pub async fn create(&self, calification: &Calification) -> Result<()> {
        self.docs.insert(calification.id, calification).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Calification>> {
        self.docs.get(id).await
    }

    pub async fn find_by_target(&self, target: TargetRef) -> Result<Vec<Calification>> {
        self.docs.find(serde_json::to_value(target)?).await
    }

    /// A user's existing calification of the target, if any
    pub async fn find_by_author_and_target(&self, user_id: Uuid, target: TargetRef) -> Result<Option<Calification>> {
        let mut filter = serde_json::to_value(target)?;
        filter["calificator"] = json!(user_id);
        self.docs.find_one(filter).await
    }

    pub async fn update(&self, id: Uuid, fields: Value) -> Result<Option<Calification>> {
        self.docs.patch(id, fields).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        self.docs.remove(id).await
    }
}
