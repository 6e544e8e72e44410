//! Event repository implementation

use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::{active, Collection};
use crate::database::store::{collections, DocumentStore};
use crate::models::event::{Event, Operator};
use crate::utils::errors::Result;

#[derive(Clone, Debug)]
pub struct EventRepository {
    docs: Collection<Event>,
}

impl EventRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            docs: Collection::new(store, collections::EVENTS),
        }
    }

    /// Create a new event
    pub async fn create(&self, event: &Event) -> Result<()> {
        self.docs.insert(event.id, event).await
    }

    /// Find event by ID, deleted events included
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        self.docs.get(id).await
    }

    pub async fn find_active(&self, id: Uuid) -> Result<Option<Event>> {
        self.docs.get_active(id).await
    }

    pub async fn find_active_many(&self, ids: &[Uuid]) -> Result<Vec<Event>> {
        self.docs.get_active_many(ids).await
    }

    pub async fn list_active(&self) -> Result<Vec<Event>> {
        self.docs.find(active()).await
    }

    /// Active events where the user holds any operator role
    pub async fn find_by_operator(&self, user_id: Uuid) -> Result<Vec<Event>> {
        self.docs
            .find(json!({ "isDeleted": false, "operators": [{ "user": user_id }] }))
            .await
    }

    /// First active event listing the activity
    pub async fn find_parent_of_activity(&self, activity_id: Uuid) -> Result<Option<Event>> {
        self.docs
            .find_one(json!({ "isDeleted": false, "activities": [activity_id] }))
            .await
    }

    /// Merge `fields` into the stored event
    pub async fn update(&self, id: Uuid, fields: Value) -> Result<Option<Event>> {
        self.docs.patch(id, fields).await
    }

    pub async fn add_operator(&self, id: Uuid, operator: &Operator) -> Result<bool> {
        self.docs.add_to_set(id, "operators", serde_json::to_value(operator)?).await
    }

    pub async fn remove_operator(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        self.docs.pull(id, "operators", json!({ "user": user_id })).await
    }

    pub async fn add_assistant(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        self.docs.add_to_set(id, "assistants", json!(user_id)).await
    }

    pub async fn remove_assistant(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        self.docs.pull(id, "assistants", json!(user_id)).await
    }

    pub async fn add_activity(&self, id: Uuid, activity_id: Uuid) -> Result<bool> {
        self.docs.add_to_set(id, "activities", json!(activity_id)).await
    }

    pub async fn add_photo(&self, id: Uuid, url: &str) -> Result<bool> {
        self.docs.add_to_set(id, "photos", json!(url)).await
    }

    pub async fn add_calification(&self, id: Uuid, calification_id: Uuid) -> Result<bool> {
        self.docs.add_to_set(id, "califications", json!(calification_id)).await
    }

    pub async fn remove_calification(&self, id: Uuid, calification_id: Uuid) -> Result<bool> {
        self.docs.pull(id, "califications", json!(calification_id)).await
    }

    pub async fn add_witness(&self, id: Uuid, witness_id: Uuid) -> Result<bool> {
        self.docs.add_to_set(id, "witnesses", json!(witness_id)).await
    }

    pub async fn remove_witness(&self, id: Uuid, witness_id: Uuid) -> Result<bool> {
        self.docs.pull(id, "witnesses", json!(witness_id)).await
    }
}
