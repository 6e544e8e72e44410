//! Event service implementation
//!
//! This service handles event lifecycle, event images, and the operator and
//! assistant lists that drive permission checks everywhere else.

use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::audit::Auditor;
use super::permissions::{require, require_admin, AccessScope, Actor, Capability, Grant};
use super::storage::{ObjectStore, UploadKind, UploadedFile};
use crate::config::UploadLimits;
use crate::database::DatabaseService;
use crate::models::event::{DEFAULT_BG_COLOR, DEFAULT_INFO_COLOR, DEFAULT_STAR_COLOR};
use crate::models::{
    ActivitySummary, AddAssistantRequest, AddOperatorRequest, AuditFields, ChangeType, CreateEventRequest, Event,
    EventDetail, EventListItem, EventSummaryFields, Operator, OperatorView, RatingStats, Role, TargetRef,
    UpdateEventRequest, UserSummary, WithHistory,
};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::{is_hex_color, non_blank};
use crate::utils::logging::{log_admin_action, log_event_action};

/// Reject any present color that is not a hex color
pub(crate) fn validate_colors(colors: &[(&str, Option<&str>)]) -> Result<()> {
    for (name, value) in colors {
        if let Some(value) = value {
            if !is_hex_color(value) {
                return Err(EventHubError::validation(format!(
                    "{} must be a valid hexadecimal color",
                    name
                )));
            }
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct EventService {
    db: DatabaseService,
    auditor: Auditor,
    objects: Arc<dyn ObjectStore>,
    limits: UploadLimits,
}

impl std::fmt::Debug for EventService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventService").finish_non_exhaustive()
    }
}

impl EventService {
    /// Create a new EventService instance
    pub fn new(db: DatabaseService, auditor: Auditor, objects: Arc<dyn ObjectStore>, limits: UploadLimits) -> Self {
        Self {
            db,
            auditor,
            objects,
            limits,
        }
    }

    /// Active event or 404
    pub async fn active_event(&self, event_id: Uuid) -> Result<Event> {
        self.db
            .events
            .find_active(event_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Event", event_id))
    }

    pub async fn create(&self, actor: &Actor, request: CreateEventRequest) -> Result<WithHistory<Event>> {
        require_admin(actor)?;

        let title = non_blank(request.title).ok_or_else(|| EventHubError::validation("Title is required"))?;
        validate_colors(&[
            ("infoColor", request.info_color.as_deref()),
            ("bgColor", request.bg_color.as_deref()),
            ("starColor", request.star_color.as_deref()),
        ])?;

        let event = Event {
            id: Uuid::new_v4(),
            logo: String::new(),
            main_image: String::new(),
            title,
            subtitle: non_blank(request.subtitle),
            description: non_blank(request.description),
            activities: Vec::new(),
            califications: Vec::new(),
            witnesses: Vec::new(),
            assistants: Vec::new(),
            operators: Vec::new(),
            place: non_blank(request.place),
            date_start: request.date_start,
            time_start: non_blank(request.time_start),
            date_end: request.date_end,
            time_end: non_blank(request.time_end),
            is_public: request.is_public.unwrap_or(true),
            photos: Vec::new(),
            info_color: request.info_color.unwrap_or_else(|| DEFAULT_INFO_COLOR.to_string()),
            bg_color: request.bg_color.unwrap_or_else(|| DEFAULT_BG_COLOR.to_string()),
            star_color: request.star_color.unwrap_or_else(|| DEFAULT_STAR_COLOR.to_string()),
            created_at: Utc::now(),
            is_deleted: false,
            audit: AuditFields::stamp(Some(actor.id), &ChangeType::Create),
        };

        self.db.events.create(&event).await?;
        self.auditor.record(event.id, Some(actor.id), ChangeType::Create).await?;
        log_event_action(event.id, "create", actor.id, Some(&event.title));

        self.auditor.with_history(event.id, event).await
    }

    /// Events visible to the caller, ordered by start date
    pub async fn list(&self, actor: Option<&Actor>) -> Result<Vec<EventListItem>> {
        let mut events: Vec<Event> = self
            .db
            .events
            .list_active()
            .await?
            .into_iter()
            .filter(|event| match actor {
                None => event.is_public,
                Some(actor) if actor.role == Role::User => {
                    event.is_public || event.is_assistant(actor.id) || event.is_operator(actor.id)
                }
                Some(_) => true,
            })
            .collect();
        events.sort_by_key(|event| event.date_start);

        let mut items = Vec::with_capacity(events.len());
        for event in &events {
            let activities = self
                .db
                .activities
                .find_active_many(&event.activities)
                .await?
                .into_iter()
                .map(|activity| ActivitySummary {
                    id: activity.id,
                    title: activity.title,
                    date: activity.date,
                    time: activity.time,
                    place: activity.place,
                })
                .collect();

            items.push(EventListItem {
                event: EventSummaryFields::from(event),
                activities,
            });
        }

        debug!(count = items.len(), "Listed events");
        Ok(items)
    }

    /// Event with activities, ratings, witnesses and people populated
    pub async fn detail(&self, actor: Option<&Actor>, event_id: Uuid) -> Result<EventDetail> {
        let event = self.active_event(event_id).await?;
        require(actor, &AccessScope::event(&event), Capability::View)?;

        let activities = self.db.activities.find_active_many(&event.activities).await?;
        let califications = self.db.califications.find_by_target(TargetRef::event(event.id)).await?;
        let witnesses = self.db.witnesses.find_by_target(TargetRef::event(event.id)).await?;
        let rating_stats = RatingStats::from_ratings(califications.iter().map(|c| c.rating));

        let mut operators = Vec::with_capacity(event.operators.len());
        for operator in &event.operators {
            operators.push(OperatorView {
                user: self
                    .db
                    .users
                    .find_active(operator.user)
                    .await?
                    .as_ref()
                    .map(UserSummary::from),
                role: operator.role,
                activities: operator.activities.clone(),
            });
        }

        let assistants = self
            .db
            .users
            .find_active_many(&event.assistants)
            .await?
            .iter()
            .map(UserSummary::from)
            .collect();

        Ok(EventDetail {
            event: EventSummaryFields::from(&event),
            activities,
            califications,
            witnesses,
            operators,
            assistants,
            rating_stats,
            changed_history: self.auditor.history(event.id).await?,
            photos: event.photos,
            created_at: event.created_at,
            is_deleted: event.is_deleted,
            audit: event.audit,
        })
    }

    /// Update event fields. Only admins may change visibility.
    pub async fn update(
        &self,
        actor: &Actor,
        event_id: Uuid,
        mut request: UpdateEventRequest,
    ) -> Result<WithHistory<Event>> {
        let event = self.active_event(event_id).await?;
        let grant = require(Some(actor), &AccessScope::event(&event), Capability::EditEvent)?;

        validate_colors(&[
            ("infoColor", request.info_color.as_deref()),
            ("bgColor", request.bg_color.as_deref()),
            ("starColor", request.star_color.as_deref()),
        ])?;

        request.title = non_blank(request.title);
        request.subtitle = non_blank(request.subtitle);
        request.description = non_blank(request.description);
        request.place = non_blank(request.place);
        request.time_start = non_blank(request.time_start);
        request.time_end = non_blank(request.time_end);
        if grant != Grant::Admin {
            request.is_public = None;
        }

        let updated = self
            .apply(event.id, serde_json::to_value(&request)?, actor, ChangeType::Update)
            .await?;
        log_event_action(event.id, "update", actor.id, None);
        self.auditor.with_history(updated.id, updated).await
    }

    /// Soft delete
    pub async fn delete(&self, actor: &Actor, event_id: Uuid) -> Result<()> {
        require_admin(actor)?;
        let event = self.active_event(event_id).await?;

        self.apply(event.id, json!({ "isDeleted": true }), actor, ChangeType::Delete)
            .await?;
        log_admin_action(actor.id, "delete_event", Some(&event_id.to_string()), None);
        Ok(())
    }

    /// Replace the event logo. Returns the new URL.
    pub async fn upload_logo(&self, actor: &Actor, event_id: Uuid, file: UploadedFile) -> Result<String> {
        self.replace_image(actor, event_id, file, UploadKind::Logo, "logo", "update-logo")
            .await
    }

    /// Replace the main image. Returns the new URL.
    pub async fn upload_main_image(&self, actor: &Actor, event_id: Uuid, file: UploadedFile) -> Result<String> {
        self.replace_image(actor, event_id, file, UploadKind::EventImage, "mainImage", "update-main-image")
            .await
    }

    async fn replace_image(
        &self,
        actor: &Actor,
        event_id: Uuid,
        file: UploadedFile,
        kind: UploadKind,
        field: &str,
        label: &str,
    ) -> Result<String> {
        let event = self.active_event(event_id).await?;
        require(Some(actor), &AccessScope::event(&event), Capability::EditEvent)?;
        kind.validate(&file, &self.limits)?;

        let stored = self.objects.store(kind.folder(), &file).await?;
        self.apply(event.id, json!({ field: stored.url }), actor, ChangeType::custom(label))
            .await?;
        log_event_action(event.id, label, actor.id, Some(&stored.url));
        Ok(stored.url)
    }

    /// Append gallery photos. Returns the URLs added.
    pub async fn upload_photos(&self, actor: &Actor, event_id: Uuid, files: Vec<UploadedFile>) -> Result<Vec<String>> {
        let event = self.active_event(event_id).await?;
        require(Some(actor), &AccessScope::event(&event), Capability::ContributeMedia)?;

        if files.is_empty() {
            return Err(EventHubError::validation("Please upload at least one photo"));
        }
        if files.len() > self.limits.max_photos_per_request {
            return Err(EventHubError::validation(format!(
                "At most {} photos can be uploaded at once",
                self.limits.max_photos_per_request
            )));
        }
        for file in &files {
            UploadKind::Photo.validate(file, &self.limits)?;
        }

        let mut urls = Vec::with_capacity(files.len());
        for file in &files {
            let stored = self.objects.store(UploadKind::Photo.folder(), file).await?;
            self.db.events.add_photo(event.id, &stored.url).await?;
            urls.push(stored.url);
        }

        self.apply(event.id, json!({}), actor, ChangeType::custom("upload-photos"))
            .await?;
        log_event_action(event.id, "upload-photos", actor.id, None);
        Ok(urls)
    }

    pub async fn add_operator(&self, actor: &Actor, event_id: Uuid, request: AddOperatorRequest) -> Result<Vec<Operator>> {
        require_admin(actor)?;
        let (Some(user_id), Some(role)) = (request.user_id, request.role) else {
            return Err(EventHubError::validation("User id and role are required"));
        };

        let event = self.active_event(event_id).await?;
        if event.is_operator(user_id) {
            return Err(EventHubError::Duplicate("User is already an operator of this event".to_string()));
        }
        self.require_user(user_id).await?;

        let operator = Operator {
            user: user_id,
            role,
            activities: request.activities,
        };
        self.db.events.add_operator(event.id, &operator).await?;
        let updated = self
            .apply(event.id, json!({}), actor, ChangeType::custom("add-operator"))
            .await?;

        info!(event_id = %event.id, user_id = %user_id, role = role.as_str(), "Operator added");
        Ok(updated.operators)
    }

    pub async fn remove_operator(&self, actor: &Actor, event_id: Uuid, user_id: Uuid) -> Result<Vec<Operator>> {
        require_admin(actor)?;
        let event = self.active_event(event_id).await?;
        if !event.is_operator(user_id) {
            return Err(EventHubError::not_found("Operator", user_id));
        }

        self.db.events.remove_operator(event.id, user_id).await?;
        let updated = self
            .apply(event.id, json!({}), actor, ChangeType::custom("remove-operator"))
            .await?;

        info!(event_id = %event.id, user_id = %user_id, "Operator removed");
        Ok(updated.operators)
    }

    pub async fn add_assistant(&self, actor: &Actor, event_id: Uuid, request: AddAssistantRequest) -> Result<Vec<Uuid>> {
        let user_id = request
            .user_id
            .ok_or_else(|| EventHubError::validation("User id is required"))?;

        let event = self.active_event(event_id).await?;
        require(Some(actor), &AccessScope::event(&event), Capability::ManageAttendance)?;

        if event.is_assistant(user_id) {
            return Err(EventHubError::Duplicate("User is already an assistant of this event".to_string()));
        }
        self.require_user(user_id).await?;

        self.db.events.add_assistant(event.id, user_id).await?;
        let updated = self
            .apply(event.id, json!({}), actor, ChangeType::custom("add-assistant"))
            .await?;

        log_event_action(event.id, "add-assistant", actor.id, Some(&user_id.to_string()));
        Ok(updated.assistants)
    }

    pub async fn remove_assistant(&self, actor: &Actor, event_id: Uuid, user_id: Uuid) -> Result<Vec<Uuid>> {
        let event = self.active_event(event_id).await?;
        require(Some(actor), &AccessScope::event(&event), Capability::ManageAttendance)?;

        if !event.is_assistant(user_id) {
            return Err(EventHubError::not_found("Assistant", user_id));
        }

        self.db.events.remove_assistant(event.id, user_id).await?;
        let updated = self
            .apply(event.id, json!({}), actor, ChangeType::custom("remove-assistant"))
            .await?;

        log_event_action(event.id, "remove-assistant", actor.id, Some(&user_id.to_string()));
        Ok(updated.assistants)
    }

    async fn require_user(&self, user_id: Uuid) -> Result<()> {
        self.db
            .users
            .find_active(user_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| EventHubError::not_found("User", user_id))
    }

    /// Patch with an audit stamp and a history record
    async fn apply(&self, event_id: Uuid, fields: Value, actor: &Actor, change: ChangeType) -> Result<Event> {
        let patch = self.auditor.stamped_patch(fields, Some(actor.id), &change)?;
        let updated = self
            .db
            .events
            .update(event_id, patch)
            .await?
            .ok_or_else(|| EventHubError::not_found("Event", event_id))?;
        self.auditor.record(event_id, Some(actor.id), change).await?;
        Ok(updated)
    }
}
