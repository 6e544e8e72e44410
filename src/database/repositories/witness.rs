//! Witness repository implementation

use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::Collection;
use crate::database::store::{collections, DocumentStore};
use crate::models::target::TargetRef;
use crate::models::witness::Witness;
use crate::utils::errors::Result;

#[derive(Clone, Debug)]
pub struct WitnessRepository {
    docs: Collection<Witness>,
}

impl WitnessRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            docs: Collection::new(store, collections::WITNESSES),
        }
    }

    pub async fn create(&self, witness: &Witness) -> Result<()> {
        self.docs.insert(witness.id, witness).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Witness>> {
        self.docs.get(id).await
    }

    pub async fn list_all(&self) -> Result<Vec<Witness>> {
        self.docs.find(json!({})).await
    }

    pub async fn find_by_target(&self, target: TargetRef) -> Result<Vec<Witness>> {
        self.docs.find(serde_json::to_value(target)?).await
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Witness>> {
        self.docs.find(json!({ "witness": user_id })).await
    }

    pub async fn find_by_user_and_target(&self, user_id: Uuid, target: TargetRef) -> Result<Option<Witness>> {
        let mut filter = serde_json::to_value(target)?;
        filter["witness"] = json!(user_id);
        self.docs.find_one(filter).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        self.docs.remove(id).await
    }
}
