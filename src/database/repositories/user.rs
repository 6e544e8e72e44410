//! User repository implementation

use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::{active, Collection};
use crate::database::store::{collections, DocumentStore};
use crate::models::user::User;
use crate::utils::errors::Result;

#[derive(Clone, Debug)]
pub struct UserRepository {
    docs: Collection<User>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            docs: Collection::new(store, collections::USERS),
        }
    }

    /// Create a new user
    pub async fn create(&self, user: &User) -> Result<()> {
        self.docs.insert(user.id, user).await
    }

    /// Find user by ID, deleted users included
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.docs.get(id).await
    }

    /// Find a user that has not been deleted
    pub async fn find_active(&self, id: Uuid) -> Result<Option<User>> {
        self.docs.get_active(id).await
    }

    pub async fn find_active_many(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        self.docs.get_active_many(ids).await
    }

    /// Find user by normalized email, deleted users included
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.docs.find_one(json!({ "email": email })).await
    }

    pub async fn list_active(&self) -> Result<Vec<User>> {
        self.docs.find(active()).await
    }

    /// Merge `fields` into the stored user
    pub async fn update(&self, id: Uuid, fields: Value) -> Result<Option<User>> {
        self.docs.patch(id, fields).await
    }

    pub async fn add_ticket(&self, user_id: Uuid, ticket_id: Uuid) -> Result<bool> {
        self.docs.add_to_set(user_id, "tickets", json!(ticket_id)).await
    }

    pub async fn remove_ticket(&self, user_id: Uuid, ticket_id: Uuid) -> Result<bool> {
        self.docs.pull(user_id, "tickets", json!(ticket_id)).await
    }
}
