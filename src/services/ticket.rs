//! Ticket service implementation
//!
//! A ticket links a user to an event and to any number of that event's
//! activities. Creating, editing and deleting tickets moves the activities'
//! seat counters through [`ActivityService`].

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use super::activity::ActivityService;
use super::audit::Auditor;
use super::permissions::{check, require, require_admin, AccessScope, Actor, Capability};
use crate::database::store::dedup_ids;
use crate::database::DatabaseService;
use crate::models::{
    Activity, AuditFields, ChangeType, CreateTicketRequest, Event, Ticket, TicketView, TitleRef, UpdateTicketRequest,
    UserSummary,
};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::non_blank;
use crate::utils::logging::{log_admin_action, log_event_action};

#[derive(Clone, Debug)]
pub struct TicketService {
    db: DatabaseService,
    auditor: Auditor,
    activities: ActivityService,
}

impl TicketService {
    /// Create a new TicketService instance
    pub fn new(db: DatabaseService, auditor: Auditor, activities: ActivityService) -> Self {
        Self { db, auditor, activities }
    }

    async fn active_ticket(&self, ticket_id: Uuid) -> Result<Ticket> {
        self.db
            .tickets
            .find_active(ticket_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Ticket", ticket_id))
    }

    async fn active_event(&self, event_id: Uuid) -> Result<Event> {
        self.db
            .events
            .find_active(event_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Event", event_id))
    }

    /// Load `ids` as active activities of `event`, or fail with 400
    async fn event_activities(&self, event: &Event, ids: &[Uuid]) -> Result<Vec<Activity>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        if ids.iter().any(|id| !event.activities.contains(id)) {
            return Err(EventHubError::validation("One or more activities do not belong to this event"));
        }

        let activities = self.db.activities.find_active_many(ids).await?;
        if activities.len() != ids.len() {
            return Err(EventHubError::validation("One or more activities are not valid"));
        }
        Ok(activities)
    }

    pub async fn create(&self, actor: &Actor, request: CreateTicketRequest) -> Result<TicketView> {
        let (Some(title), Some(event_id), Some(user_id)) = (non_blank(request.title), request.event, request.user)
        else {
            return Err(EventHubError::validation("Title, event and user are required"));
        };

        let event = self.active_event(event_id).await?;
        require(Some(actor), &AccessScope::event(&event), Capability::ManageAttendance)?;

        let holder = self
            .db
            .users
            .find_active(user_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("User", user_id))?;

        let activity_ids = dedup_ids(&request.activities);
        let activities = self.event_activities(&event, &activity_ids).await?;
        self.activities.reserve_all(&activities).await?;

        let ticket = Ticket {
            id: Uuid::new_v4(),
            ticket_type: request.ticket_type.unwrap_or(0),
            title,
            event: event.id,
            role: request.role.unwrap_or_default(),
            price: request.price.unwrap_or(0.0),
            description: non_blank(request.description),
            user: holder.id,
            activities: activity_ids,
            created_at: Utc::now(),
            is_deleted: false,
            audit: AuditFields::stamp(Some(actor.id), &ChangeType::Create),
        };

        if let Err(e) = self.db.tickets.create(&ticket).await {
            self.activities.release_all(&ticket.activities).await?;
            return Err(e);
        }

        self.db.users.add_ticket(holder.id, ticket.id).await?;
        if self.db.events.add_assistant(event.id, holder.id).await? {
            debug!(event_id = %event.id, user_id = %holder.id, "Ticket holder added as assistant");
        }
        self.auditor.record(ticket.id, Some(actor.id), ChangeType::Create).await?;
        log_event_action(event.id, "create_ticket", actor.id, Some(&ticket.id.to_string()));

        self.view(ticket).await
    }

    /// All tickets for admins, tickets of operated events for everyone else
    pub async fn list(&self, actor: &Actor) -> Result<Vec<TicketView>> {
        let tickets = if actor.is_admin() {
            self.db.tickets.list_active().await?
        } else {
            let operated: Vec<Uuid> = self
                .db
                .events
                .find_by_operator(actor.id)
                .await?
                .into_iter()
                .map(|event| event.id)
                .collect();
            self.db.tickets.find_by_events(&operated).await?
        };
        self.views(tickets).await
    }

    /// Tickets held by `user_id`; visible to that user, admins, and operators
    /// of any event the tickets belong to
    pub async fn by_user(&self, actor: &Actor, user_id: Uuid) -> Result<Vec<TicketView>> {
        let tickets = self.db.tickets.find_by_user(user_id).await?;

        if actor.id != user_id && !actor.is_admin() {
            let event_ids = dedup_ids(&tickets.iter().map(|t| t.event).collect::<Vec<_>>());
            let events = self.db.events.find_active_many(&event_ids).await?;
            let operates_any = events.iter().any(|event| {
                check(Some(actor), &AccessScope::event(event), Capability::Operate).is_granted()
            });
            if !operates_any {
                return Err(EventHubError::forbidden("Not authorized to view this user's tickets"));
            }
        }

        self.views(tickets).await
    }

    pub async fn by_event(&self, actor: &Actor, event_id: Uuid) -> Result<Vec<TicketView>> {
        let event = self.active_event(event_id).await?;
        require(Some(actor), &AccessScope::event(&event), Capability::Operate)?;

        let tickets = self.db.tickets.find_by_event(event.id).await?;
        self.views(tickets).await
    }

    /// One ticket, for its holder, an admin, or an operator of its event
    pub async fn get(&self, actor: &Actor, ticket_id: Uuid) -> Result<TicketView> {
        let ticket = self.active_ticket(ticket_id).await?;

        if actor.id != ticket.user {
            let event = self.db.events.find_by_id(ticket.event).await?;
            let scope = event.as_ref().map(AccessScope::event).unwrap_or_default();
            require(Some(actor), &scope, Capability::Operate)?;
        }

        self.view(ticket).await
    }

    /// Update ticket fields. A new activity list reserves the added
    /// activities first and then releases the removed ones.
    pub async fn update(&self, actor: &Actor, ticket_id: Uuid, request: UpdateTicketRequest) -> Result<TicketView> {
        let ticket = self.active_ticket(ticket_id).await?;
        let event = self.db.events.find_by_id(ticket.event).await?;
        let scope = event.as_ref().map(AccessScope::event).unwrap_or_default();
        require(Some(actor), &scope, Capability::ManageAttendance)?;

        let mut fields = serde_json::Map::new();
        if let Some(title) = non_blank(request.title) {
            fields.insert("title".into(), json!(title));
        }
        if let Some(ticket_type) = request.ticket_type {
            fields.insert("type".into(), json!(ticket_type));
        }
        if let Some(role) = request.role {
            fields.insert("role".into(), json!(role));
        }
        if let Some(price) = request.price {
            fields.insert("price".into(), json!(price));
        }
        if let Some(description) = request.description {
            fields.insert("description".into(), json!(non_blank(Some(description))));
        }

        if let Some(requested) = request.activities {
            let requested = dedup_ids(&requested);
            let added: Vec<Uuid> = requested
                .iter()
                .copied()
                .filter(|id| !ticket.activities.contains(id))
                .collect();
            let removed: Vec<Uuid> = ticket
                .activities
                .iter()
                .copied()
                .filter(|id| !requested.contains(id))
                .collect();

            if !added.is_empty() {
                let event = event
                    .as_ref()
                    .ok_or_else(|| EventHubError::not_found("Event", ticket.event))?;
                let activities = self.event_activities(event, &added).await?;
                self.activities.reserve_all(&activities).await?;
            }
            self.activities.release_all(&removed).await?;

            debug!(
                ticket_id = %ticket.id,
                added = added.len(),
                removed = removed.len(),
                "Ticket activities changed"
            );
            fields.insert("activities".into(), json!(requested));
        }

        let updated = self
            .apply(ticket.id, Value::Object(fields), actor, ChangeType::Update)
            .await?;
        log_event_action(updated.event, "update_ticket", actor.id, Some(&updated.id.to_string()));
        self.view(updated).await
    }

    /// Soft delete, admin only. Frees the ticket's seats.
    pub async fn delete(&self, actor: &Actor, ticket_id: Uuid) -> Result<()> {
        let ticket = self.active_ticket(ticket_id).await?;
        require_admin(actor)?;

        self.activities.release_all(&ticket.activities).await?;
        self.apply(ticket.id, json!({ "isDeleted": true }), actor, ChangeType::Delete)
            .await?;
        self.db.users.remove_ticket(ticket.user, ticket.id).await?;

        log_admin_action(actor.id, "delete_ticket", Some(&ticket.id.to_string()), None);
        info!(ticket_id = %ticket.id, user_id = %ticket.user, "Ticket deleted");
        Ok(())
    }

    async fn apply(&self, ticket_id: Uuid, fields: Value, actor: &Actor, change: ChangeType) -> Result<Ticket> {
        let patch = self.auditor.stamped_patch(fields, Some(actor.id), &change)?;
        let updated = self
            .db
            .tickets
            .update(ticket_id, patch)
            .await?
            .ok_or_else(|| EventHubError::not_found("Ticket", ticket_id))?;
        self.auditor.record(ticket_id, Some(actor.id), change).await?;
        Ok(updated)
    }

    async fn views(&self, tickets: Vec<Ticket>) -> Result<Vec<TicketView>> {
        let mut views = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            views.push(self.view(ticket).await?);
        }
        Ok(views)
    }

    /// Populate the holder, the event title and the activity titles
    async fn view(&self, ticket: Ticket) -> Result<TicketView> {
        let user = self.db.users.find_by_id(ticket.user).await?.as_ref().map(UserSummary::from);
        let event = self.db.events.find_by_id(ticket.event).await?.map(|event| TitleRef {
            id: event.id,
            title: event.title,
        });
        let activities = self
            .db
            .activities
            .find_active_many(&ticket.activities)
            .await?
            .into_iter()
            .map(|activity| TitleRef {
                id: activity.id,
                title: activity.title,
            })
            .collect();
        let changed_history = self.auditor.history(ticket.id).await?;

        Ok(TicketView {
            id: ticket.id,
            ticket_type: ticket.ticket_type,
            title: ticket.title,
            event,
            role: ticket.role,
            price: ticket.price,
            description: ticket.description,
            user,
            activities,
            created_at: ticket.created_at,
            is_deleted: ticket.is_deleted,
            audit: ticket.audit,
            changed_history,
        })
    }
}
