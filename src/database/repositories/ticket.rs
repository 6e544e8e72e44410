//! Ticket repository implementation

use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::{active, Collection};
use crate::database::store::{collections, DocumentStore};
use crate::models::ticket::Ticket;
use crate::utils::errors::Result;

#[derive(Clone, Debug)]
pub struct TicketRepository {
    docs: Collection<Ticket>,
}

impl TicketRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            docs: Collection::new(store, collections::TICKETS),
        }
    }

    pub async fn create(&self, ticket: &Ticket) -> Result<()> {
        self.docs.insert(ticket.id, ticket).await
    }

    pub async fn find_active(&self, id: Uuid) -> Result<Option<Ticket>> {
        self.docs.get_active(id).await
    }

    pub async fn list_active(&self) -> Result<Vec<Ticket>> {
        self.docs.find(active()).await
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Ticket>> {
        self.docs
            .find(json!({ "isDeleted": false, "user": user_id }))
            .await
    }

    pub async fn find_by_event(&self, event_id: Uuid) -> Result<Vec<Ticket>> {
        self.docs
            .find(json!({ "isDeleted": false, "event": event_id }))
            .await
    }

    /// Active tickets belonging to any of the events
    pub async fn find_by_events(&self, event_ids: &[Uuid]) -> Result<Vec<Ticket>> {
        let mut tickets = Vec::new();
        for event_id in event_ids {
            tickets.extend(self.find_by_event(*event_id).await?);
        }
        Ok(tickets)
    }

    pub async fn update(&self, id: Uuid, fields: Value) -> Result<Option<Ticket>> {
        self.docs.patch(id, fields).await
    }
}
