//! Activity repository implementation

use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::Collection;
use crate::database::store::{collections, DocumentStore, SeatReservation};
use crate::models::activity::Activity;
use crate::utils::errors::Result;

#[derive(Clone, Debug)]
pub struct ActivityRepository {
    docs: Collection<Activity>,
}

impl ActivityRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            docs: Collection::new(store, collections::ACTIVITIES),
        }
    }

    pub async fn create(&self, activity: &Activity) -> Result<()> {
        self.docs.insert(activity.id, activity).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Activity>> {
        self.docs.get(id).await
    }

    pub async fn find_active(&self, id: Uuid) -> Result<Option<Activity>> {
        self.docs.get_active(id).await
    }

    pub async fn find_active_many(&self, ids: &[Uuid]) -> Result<Vec<Activity>> {
        self.docs.get_active_many(ids).await
    }

    /// Merge `fields` into the stored activity. Never pass `takenSeats` here.
    pub async fn update(&self, id: Uuid, fields: Value) -> Result<Option<Activity>> {
        self.docs.patch(id, fields).await
    }

    /// Atomically take one seat on each activity, or on none
    pub async fn reserve_seats(&self, ids: &[Uuid]) -> Result<SeatReservation> {
        self.docs.store().reserve_seats(ids).await
    }

    /// Give back one seat on each activity that has any taken
    pub async fn release_seats(&self, ids: &[Uuid]) -> Result<Vec<Uuid>> {
        self.docs.store().release_seats(ids).await
    }

    /// Change the capacity; false when it would drop below the seats taken
    pub async fn set_seats(&self, id: Uuid, seats: u32) -> Result<bool> {
        self.docs.store().set_seats(id, u64::from(seats)).await
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
