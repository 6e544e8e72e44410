//! Activity service implementation
//!
//! Activities belong to one event and inherit its operators, assistants and
//! visibility. Seat counters move only through the store's atomic reserve
//! and release operations.

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use super::audit::Auditor;
use super::event::validate_colors;
use super::permissions::{require, require_admin, AccessScope, Actor, Capability};
use super::witness::WitnessService;
use crate::database::{DatabaseService, SeatReservation};
use crate::models::event::{DEFAULT_BG_COLOR, DEFAULT_INFO_COLOR, DEFAULT_STAR_COLOR};
use crate::models::{
    Activity, AuditFields, ChangeType, CreateActivityRequest, Event, SeatChangeResponse, TargetRef,
    UpdateActivityRequest, WithHistory, Witness,
};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::non_blank;
use crate::utils::logging::{log_event_action, log_seat_change};

#[derive(Clone, Debug)]
pub struct ActivityService {
    db: DatabaseService,
    auditor: Auditor,
    witnesses: WitnessService,
}

impl ActivityService {
    /// Create a new ActivityService instance
    pub fn new(db: DatabaseService, auditor: Auditor, witnesses: WitnessService) -> Self {
        Self { db, auditor, witnesses }
    }

    async fn active_activity(&self, activity_id: Uuid) -> Result<Activity> {
        self.db
            .activities
            .find_active(activity_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Activity", activity_id))
    }

    /// Active activity together with its governing event
    async fn with_parent(&self, activity_id: Uuid) -> Result<(Activity, Event)> {
        let activity = self.active_activity(activity_id).await?;
        let event = self.db.targets.parent_event(activity.id).await?;
        Ok((activity, event))
    }

    async fn active_event(&self, event_id: Uuid) -> Result<Event> {
        self.db
            .events
            .find_active(event_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Event", event_id))
    }

    pub async fn create(
        &self,
        actor: &Actor,
        event_id: Uuid,
        request: CreateActivityRequest,
    ) -> Result<WithHistory<Activity>> {
        let event = self.active_event(event_id).await?;
        require(Some(actor), &AccessScope::event(&event), Capability::CreateActivity)?;

        let title = non_blank(request.title).ok_or_else(|| EventHubError::validation("Title is required"))?;
        validate_colors(&[
            ("infoColor", request.info_color.as_deref()),
            ("bgColor", request.bg_color.as_deref()),
            ("starColor", request.star_color.as_deref()),
        ])?;
        let seats = checked_seats(request.seats.unwrap_or(0))?;

        let activity = Activity {
            id: Uuid::new_v4(),
            ticket_type: request.ticket_type.unwrap_or(0),
            title,
            subtitle: non_blank(request.subtitle),
            description: non_blank(request.description),
            organization: non_blank(request.organization),
            califications: Vec::new(),
            witnesses: Vec::new(),
            date: request.date,
            time: non_blank(request.time),
            place: non_blank(request.place),
            info_color: request.info_color.unwrap_or_else(|| DEFAULT_INFO_COLOR.to_string()),
            bg_color: request.bg_color.unwrap_or_else(|| DEFAULT_BG_COLOR.to_string()),
            star_color: request.star_color.unwrap_or_else(|| DEFAULT_STAR_COLOR.to_string()),
            seats,
            taken_seats: 0,
            created_at: Utc::now(),
            is_deleted: false,
            audit: AuditFields::stamp(Some(actor.id), &ChangeType::Create),
        };

        self.db.activities.create(&activity).await?;
        self.db.events.add_activity(event.id, activity.id).await?;
        self.auditor.record(activity.id, Some(actor.id), ChangeType::Create).await?;
        log_event_action(event.id, "create_activity", actor.id, Some(&activity.title));

        self.auditor.with_history(activity.id, activity).await
    }

    /// Active activities of an event, ordered by date and time
    pub async fn list_for_event(&self, actor: Option<&Actor>, event_id: Uuid) -> Result<Vec<Activity>> {
        let event = self.active_event(event_id).await?;
        require(actor, &AccessScope::event(&event), Capability::View)?;

        let mut activities = self.db.activities.find_active_many(&event.activities).await?;
        activities.sort_by(|a, b| (a.date, &a.time).cmp(&(b.date, &b.time)));
        Ok(activities)
    }

    pub async fn get(&self, actor: Option<&Actor>, activity_id: Uuid) -> Result<WithHistory<Activity>> {
        let (activity, event) = self.with_parent(activity_id).await?;
        require(actor, &AccessScope::event(&event), Capability::View)?;
        self.auditor.with_history(activity.id, activity).await
    }

    /// Update activity fields. `ticketType` needs an admin or general operator;
    /// `seats` may not drop below the seats already taken unless set to 0.
    pub async fn update(
        &self,
        actor: &Actor,
        activity_id: Uuid,
        mut request: UpdateActivityRequest,
    ) -> Result<WithHistory<Activity>> {
        let (activity, event) = self.with_parent(activity_id).await?;
        let grant = require(
            Some(actor),
            &AccessScope::event(&event),
            Capability::EditActivity(activity.id),
        )?;

        validate_colors(&[
            ("infoColor", request.info_color.as_deref()),
            ("bgColor", request.bg_color.as_deref()),
            ("starColor", request.star_color.as_deref()),
        ])?;

        let seats = request.seats.take().map(checked_seats).transpose()?;

        request.title = non_blank(request.title);
        request.subtitle = non_blank(request.subtitle);
        request.description = non_blank(request.description);
        request.organization = non_blank(request.organization);
        request.time = non_blank(request.time);
        request.place = non_blank(request.place);
        if !grant.is_privileged() {
            request.ticket_type = None;
        }

        // Compared with takenSeats under the store's lock
        if let Some(seats) = seats {
            if !self.db.activities.set_seats(activity.id, seats).await? {
                let taken = self
                    .active_activity(activity.id)
                    .await
                    .map_or(activity.taken_seats, |current| current.taken_seats);
                return Err(EventHubError::validation(format!(
                    "Seats cannot be lower than the {} seats already taken",
                    taken
                )));
            }
        }

        let updated = self
            .apply(activity.id, serde_json::to_value(&request)?, actor, ChangeType::Update)
            .await?;
        log_event_action(event.id, "update_activity", actor.id, Some(&activity.id.to_string()));
        self.auditor.with_history(updated.id, updated).await
    }

    /// Soft delete, admin only
    pub async fn delete(&self, actor: &Actor, activity_id: Uuid) -> Result<()> {
        let (activity, event) = self.with_parent(activity_id).await?;
        require_admin(actor)?;

        self.apply(activity.id, json!({ "isDeleted": true }), actor, ChangeType::Delete)
            .await?;
        log_event_action(event.id, "delete_activity", actor.id, Some(&activity.id.to_string()));
        Ok(())
    }

    /// Record attendance of `user_id` at the activity
    pub async fn add_witness(&self, actor: &Actor, activity_id: Uuid, user_id: Option<Uuid>) -> Result<Vec<Uuid>> {
        let user_id = user_id.ok_or_else(|| EventHubError::validation("User id is required"))?;
        let activity = self.active_activity(activity_id).await?;

        self.witnesses
            .create_for(actor, user_id, TargetRef::activity(activity.id))
            .await?;
        self.activity_witnesses(activity.id).await
    }

    /// Remove the attendance record of `user_id` at the activity
    pub async fn remove_witness(&self, actor: &Actor, activity_id: Uuid, user_id: Uuid) -> Result<Vec<Uuid>> {
        let activity = self.active_activity(activity_id).await?;
        let target = TargetRef::activity(activity.id);

        let record: Witness = self
            .db
            .witnesses
            .find_by_user_and_target(user_id, target)
            .await?
            .ok_or_else(|| EventHubError::not_found("Witness", user_id))?;

        self.witnesses.delete(actor, record.id).await?;
        self.activity_witnesses(activity.id).await
    }

    async fn activity_witnesses(&self, activity_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(self.active_activity(activity_id).await?.witnesses)
    }

    /// Take one seat
    pub async fn increment_seats(&self, actor: &Actor, activity_id: Uuid) -> Result<SeatChangeResponse> {
        let activity = self.active_activity(activity_id).await?;

        match self.db.activities.reserve_seats(&[activity.id]).await? {
            SeatReservation::Reserved => {}
            SeatReservation::Blocked(_) => {
                return Err(EventHubError::SeatsUnavailable { activity: activity.title })
            }
        }

        let updated = self.active_activity(activity.id).await?;
        debug!(activity_id = %activity.id, user_id = %actor.id, taken = updated.taken_seats, "Seat taken");
        Ok(SeatChangeResponse {
            message: "Seat reserved successfully".to_string(),
            taken_seats: updated.taken_seats,
            available_seats: updated.available_seats(),
        })
    }

    /// Free one seat
    pub async fn decrement_seats(&self, actor: &Actor, activity_id: Uuid) -> Result<SeatChangeResponse> {
        let activity = self.active_activity(activity_id).await?;

        if self.db.activities.release_seats(&[activity.id]).await?.is_empty() {
            return Err(EventHubError::NoOccupiedSeats);
        }

        let updated = self.active_activity(activity.id).await?;
        debug!(activity_id = %activity.id, user_id = %actor.id, taken = updated.taken_seats, "Seat released");
        Ok(SeatChangeResponse {
            message: "Seat released successfully".to_string(),
            taken_seats: updated.taken_seats,
            available_seats: updated.available_seats(),
        })
    }

    /// Reserve seats on every listed activity or none of them
    pub async fn reserve_all(&self, activities: &[Activity]) -> Result<()> {
        let ids: Vec<Uuid> = activities.iter().map(|a| a.id).collect();
        if ids.is_empty() {
            return Ok(());
        }

        match self.db.activities.reserve_seats(&ids).await? {
            SeatReservation::Reserved => {
                log_seat_change(&ids, "reserve", true);
                Ok(())
            }
            SeatReservation::Blocked(blocked) => {
                log_seat_change(&ids, "reserve", false);
                let title = activities
                    .iter()
                    .find(|a| a.id == blocked)
                    .map(|a| a.title.clone())
                    .unwrap_or_else(|| blocked.to_string());
                Err(EventHubError::SeatsUnavailable { activity: title })
            }
        }
    }

    /// Release one seat on each listed activity
    pub async fn release_all(&self, ids: &[Uuid]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let released = self.db.activities.release_seats(ids).await?;
        log_seat_change(&released, "release", true);
        if released.len() != ids.len() {
            info!(requested = ids.len(), released = released.len(), "Some activities had no seats to release");
        }
        Ok(())
    }

    async fn apply(&self, activity_id: Uuid, fields: Value, actor: &Actor, change: ChangeType) -> Result<Activity> {
        let patch = self.auditor.stamped_patch(fields, Some(actor.id), &change)?;
        let updated = self
            .db
            .activities
            .update(activity_id, patch)
            .await?
            .ok_or_else(|| EventHubError::not_found("Activity", activity_id))?;
        self.auditor.record(activity_id, Some(actor.id), change).await?;
        Ok(updated)
    }
}

fn checked_seats(seats: i64) -> Result<u32> {
    u32::try_from(seats).map_err(|_| EventHubError::validation("Seats must be a non-negative number"))
}
