//! Resolution of polymorphic `{targetModel, target}` references

use uuid::Uuid;

use super::repositories::{ActivityRepository, EventRepository, UserRepository};
use crate::models::{Activity, Event, TargetKind, TargetRef, User};
use crate::utils::errors::{EventHubError, Result};

#[derive(Debug, Clone)]
pub enum ResolvedTarget {
    Event(Event),
    Activity(Activity),
    User(User),
}

impl ResolvedTarget {
    pub fn kind(&self) -> TargetKind {
        match self {
            ResolvedTarget::Event(_) => TargetKind::Event,
            ResolvedTarget::Activity(_) => TargetKind::Activity,
            ResolvedTarget::User(_) => TargetKind::User,
        }
    }
}

/// Per-kind lookup table over the entity repositories
#[derive(Clone, Debug)]
pub struct TargetResolver {
    events: EventRepository,
    activities: ActivityRepository,
    users: UserRepository,
}

impl TargetResolver {
    pub fn new(events: EventRepository, activities: ActivityRepository, users: UserRepository) -> Self {
        Self {
            events,
            activities,
            users,
        }
    }

    /// Load the target, failing with 404 when it is missing or soft-deleted
    pub async fn resolve_active(&self, target: TargetRef) -> Result<ResolvedTarget> {
        let missing = || EventHubError::not_found(target.kind.as_str(), target.id);

        match target.kind {
            TargetKind::Event => self
                .events
                .find_active(target.id)
                .await?
                .map(ResolvedTarget::Event)
                .ok_or_else(missing),
            TargetKind::Activity => self
                .activities
                .find_active(target.id)
                .await?
                .map(ResolvedTarget::Activity)
                .ok_or_else(missing),
            TargetKind::User => self
                .users
                .find_active(target.id)
                .await?
                .map(ResolvedTarget::User)
                .ok_or_else(missing),
        }
    }

    /// False when the target is missing or soft-deleted
    pub async fn is_active(&self, target: TargetRef) -> Result<bool> {
        match self.resolve_active(target).await {
            Ok(_) => Ok(true),
            Err(EventHubError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Drop the records attached to a target that no longer resolves.
    /// Records without a target are kept.
    pub async fn retain_active<T>(
        &self,
        records: Vec<T>,
        target_of: impl Fn(&T) -> Option<TargetRef>,
    ) -> Result<Vec<T>> {
        let mut kept = Vec::with_capacity(records.len());
        for record in records {
            match target_of(&record) {
                Some(target) if !self.is_active(target).await? => {}
                _ => kept.push(record),
            }
        }
        Ok(kept)
    }

    /// Active event that owns the activity
    pub async fn parent_event(&self, activity_id: Uuid) -> Result<Event> {
        self.events
            .find_parent_of_activity(activity_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Parent event", activity_id))
    }

    /// The event whose operators and assistants govern access to the target.
    /// User targets have none.
    pub async fn governing_event(&self, target: &ResolvedTarget) -> Result<Option<Event>> {
        match target {
            ResolvedTarget::Event(event) => Ok(Some(event.clone())),
            ResolvedTarget::Activity(activity) => self.parent_event(activity.id).await.map(Some),
            ResolvedTarget::User(_) => Ok(None),
        }
    }
}
