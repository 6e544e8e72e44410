//! File metadata repository implementation

use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::Collection;
use crate::database::store::{collections, DocumentStore};
use crate::models::file::FileRecord;
use crate::models::target::TargetRef;
use crate::utils::errors::Result;

#[derive(Clone, Debug)]
pub struct FileRepository {
    docs: Collection<FileRecord>,
}

impl FileRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            docs: Collection::new(store, collections::FILES),
        }
    }

    pub async fn create(&self, file: &FileRecord) -> Result<()> {
        self.docs.insert(file.id, file).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<FileRecord>> {
        self.docs.get(id).await
    }

    pub async fn list_all(&self) -> Result<Vec<FileRecord>> {
        self.docs.find(json!({})).await
    }

    pub async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<FileRecord>> {
        self.docs.find(json!({ "owner": owner })).await
    }

    pub async fn find_by_target(&self, target: TargetRef) -> Result<Vec<FileRecord>> {
        self.docs.find(serde_json::to_value(target)?).await
    }

    pub async fn update(&self, id: Uuid, fields: Value) -> Result<Option<FileRecord>> {
        self.docs.patch(id, fields).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        self.docs.remove(id).await
    }
}
