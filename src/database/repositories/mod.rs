//! Database repositories module
//!
//! Typed access to the document collections. Each repository wraps the shared
//! [`DocumentStore`] and converts documents to and from the model types.

pub mod activity;
pub mod calification;
pub mod event;
pub mod file;
pub mod main_config;
pub mod ticket;
pub mod user;
pub mod witness;

// Re-export repositories
pub use activity::ActivityRepository;
pub use calification::CalificationRepository;
pub use event::EventRepository;
pub use file::FileRepository;
pub use main_config::MainConfigRepository;
pub use ticket::TicketRepository;
pub use user::UserRepository;
pub use witness::WitnessRepository;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

use super::store::DocumentStore;
use crate::utils::errors::Result;

/// Entities that are soft-deleted rather than removed
pub trait SoftDelete {
    fn is_deleted(&self) -> bool;
}

macro_rules! impl_soft_delete {
    ($($ty:ty),*) => {
        $(impl SoftDelete for $ty {
            fn is_deleted(&self) -> bool {
                self.is_deleted
            }
        })*
    };
}

impl_soft_delete!(
    crate::models::User,
    crate::models::Event,
    crate::models::Activity,
    crate::models::Ticket
);

/// Filter matching documents that are not soft-deleted
pub(crate) fn active() -> Value {
    json!({ "isDeleted": false })
}

/// Typed view over one collection
pub(crate) struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    name: &'static str,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            name: self.name,
            _entity: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection").field("name", &self.name).finish()
    }
}

impl<T: Serialize + DeserializeOwned> Collection<T> {
    pub fn new(store: Arc<dyn DocumentStore>, name: &'static str) -> Self {
        Self {
            store,
            name,
            _entity: PhantomData,
        }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub async fn insert(&self, id: Uuid, entity: &T) -> Result<()> {
        self.store.insert(self.name, id, serde_json::to_value(entity)?).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<T>> {
        self.store
            .get(self.name, id)
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn find(&self, filter: Value) -> Result<Vec<T>> {
        self.store
            .find(self.name, &filter)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn find_one(&self, filter: Value) -> Result<Option<T>> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    pub async fn patch(&self, id: Uuid, fields: Value) -> Result<Option<T>> {
        self.store
            .patch(self.name, id, fields)
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn add_to_set(&self, id: Uuid, field: &str, value: Value) -> Result<bool> {
        self.store.add_to_set(self.name, id, field, value).await
    }

    pub async fn pull(&self, id: Uuid, field: &str, value: Value) -> Result<bool> {
        self.store.pull(self.name, id, field, &value).await
    }

    pub async fn remove(&self, id: Uuid) -> Result<bool> {
        self.store.remove(self.name, id).await
    }
}

impl<T: Serialize + DeserializeOwned + SoftDelete> Collection<T> {
    /// Lookup that treats soft-deleted documents as missing
    pub async fn get_active(&self, id: Uuid) -> Result<Option<T>> {
        Ok(self.get(id).await?.filter(|entity| !entity.is_deleted()))
    }

    /// Active documents among `ids`, in the order given
    pub async fn get_active_many(&self, ids: &[Uuid]) -> Result<Vec<T>> {
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(entity) = self.get_active(*id).await? {
                found.push(entity);
            }
        }
        Ok(found)
    }
}

fn decode<T: DeserializeOwned>(doc: Value) -> Result<T> {
    Ok(serde_json::from_value(doc)?)
}
