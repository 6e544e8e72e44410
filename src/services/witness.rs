//! Witness service implementation
//!
//! A witness record states that a user attended an event or an activity.
//! Records are managed by the event's operators and unlock ratings.

use chrono::Utc;
use serde_json::json;
use std::cmp::Reverse;
use tracing::info;
use uuid::Uuid;

use super::audit::Auditor;
use super::permissions::{require, require_admin, AccessScope, Actor, Capability};
use crate::database::{DatabaseService, ResolvedTarget};
use crate::models::{ChangeType, CreateWitnessRequest, Event, TargetKind, TargetRef, UserSummary, Witness, WitnessView};
use crate::utils::errors::{EventHubError, Result};

/// Parse a `targetModel` naming an event or an activity
pub(crate) fn attendance_target_kind(model: &str) -> Result<TargetKind> {
    match model.parse::<TargetKind>() {
        Ok(kind @ (TargetKind::Event | TargetKind::Activity)) => Ok(kind),
        _ => Err(EventHubError::validation("Target model must be Event or Activity")),
    }
}

#[derive(Clone, Debug)]
pub struct WitnessService {
    db: DatabaseService,
    auditor: Auditor,
}

impl WitnessService {
    /// Create a new WitnessService instance
    pub fn new(db: DatabaseService, auditor: Auditor) -> Self {
        Self { db, auditor }
    }

    pub async fn create(&self, actor: &Actor, request: CreateWitnessRequest) -> Result<Witness> {
        let (Some(user_id), Some(target), Some(model)) = (request.witness, request.target, request.target_model) else {
            return Err(EventHubError::validation("Witness, target and target model are required"));
        };
        let kind = attendance_target_kind(&model)?;
        self.create_for(actor, user_id, TargetRef::new(kind, target)).await
    }

    /// Record `user_id` as a witness of `target`
    pub async fn create_for(&self, actor: &Actor, user_id: Uuid, target: TargetRef) -> Result<Witness> {
        self.db
            .users
            .find_active(user_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("User", user_id))?;

        let resolved = self.db.targets.resolve_active(target).await?;
        let event = self.authorize_management(actor, &resolved).await?;

        if self.db.witnesses.find_by_user_and_target(user_id, target).await?.is_some() {
            return Err(EventHubError::Duplicate(format!(
                "User is already a witness of this {}",
                target.kind.as_str().to_lowercase()
            )));
        }

        let record = Witness {
            id: Uuid::new_v4(),
            witness: user_id,
            target,
            created_at: Utc::now(),
        };
        self.db.witnesses.create(&record).await?;

        match target.kind {
            TargetKind::Event => {
                self.db.events.add_witness(target.id, record.id).await?;
            }
            _ => {
                self.db.activities.add_witness(target.id, record.id).await?;
            }
        }
        self.stamp_target(actor, target, "add-witness").await?;

        info!(
            witness_id = %record.id,
            user_id = %user_id,
            target = %target.kind,
            target_id = %target.id,
            event_id = %event.id,
            "Witness recorded"
        );
        Ok(record)
    }

    pub async fn list_all(&self, actor: &Actor) -> Result<Vec<WitnessView>> {
        require_admin(actor)?;
        let records = self.db.witnesses.list_all().await?;
        let records = self.db.targets.retain_active(records, |r| Some(r.target)).await?;
        self.views(records).await
    }

    /// Witnesses of one target, for the event's operators
    pub async fn by_target(&self, actor: &Actor, model: &str, target_id: Uuid) -> Result<Vec<WitnessView>> {
        let target = TargetRef::new(attendance_target_kind(model)?, target_id);
        let resolved = self.db.targets.resolve_active(target).await?;
        if let Some(event) = self.db.targets.governing_event(&resolved).await? {
            require(Some(actor), &AccessScope::event(&event), Capability::Operate)?;
        }

        let records = self.db.witnesses.find_by_target(target).await?;
        self.views(records).await
    }

    /// Witness records of a user, for that user or an admin
    pub async fn by_user(&self, actor: &Actor, user_id: Uuid) -> Result<Vec<Witness>> {
        require(Some(actor), &AccessScope::owned(user_id, user_id), Capability::Own)?;
        let records = self.db.witnesses.find_by_user(user_id).await?;
        let mut records = self.db.targets.retain_active(records, |r| Some(r.target)).await?;
        records.sort_by_key(|r| Reverse(r.created_at));
        Ok(records)
    }

    pub async fn delete(&self, actor: &Actor, witness_id: Uuid) -> Result<()> {
        let record = self
            .db
            .witnesses
            .find_by_id(witness_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Witness", witness_id))?;

        let resolved = self.db.targets.resolve_active(record.target).await?;
        self.authorize_management(actor, &resolved).await?;

        match record.target.kind {
            TargetKind::Event => {
                self.db.events.remove_witness(record.target.id, record.id).await?;
            }
            _ => {
                self.db.activities.remove_witness(record.target.id, record.id).await?;
            }
        }
        self.db.witnesses.delete(record.id).await?;
        self.stamp_target(actor, record.target, "remove-witness").await?;

        info!(witness_id = %record.id, actor_id = %actor.id, "Witness removed");
        Ok(())
    }

    /// Event witnesses need attendance management on the event, activity
    /// witnesses need it on that activity. Returns the governing event.
    async fn authorize_management(&self, actor: &Actor, target: &ResolvedTarget) -> Result<Event> {
        let (event, capability) = match target {
            ResolvedTarget::Event(event) => (event.clone(), Capability::ManageAttendance),
            ResolvedTarget::Activity(activity) => (
                self.db.targets.parent_event(activity.id).await?,
                Capability::ManageActivityAttendance(activity.id),
            ),
            ResolvedTarget::User(_) => {
                return Err(EventHubError::validation("Target model must be Event or Activity"))
            }
        };

        require(Some(actor), &AccessScope::event(&event), capability)?;
        Ok(event)
    }

    async fn stamp_target(&self, actor: &Actor, target: TargetRef, label: &str) -> Result<()> {
        let change = ChangeType::custom(label);
        let patch = self.auditor.stamped_patch(json!({}), Some(actor.id), &change)?;
        match target.kind {
            TargetKind::Event => {
                self.db.events.update(target.id, patch).await?;
            }
            _ => {
                self.db.activities.update(target.id, patch).await?;
            }
        }
        self.auditor.record(target.id, Some(actor.id), change).await
    }

    /// Newest first, with the witness user populated
    async fn views(&self, mut records: Vec<Witness>) -> Result<Vec<WitnessView>> {
        records.sort_by_key(|r| Reverse(r.created_at));

        let mut views = Vec::with_capacity(records.len());
        for record in records {
            let witness_user = self
                .db
                .users
                .find_by_id(record.witness)
                .await?
                .as_ref()
                .map(UserSummary::from);
            views.push(WitnessView { record, witness_user });
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_attendance_target_kind() {
        assert_eq!(attendance_target_kind("Event").unwrap(), TargetKind::Event);
        assert_eq!(attendance_target_kind("activity").unwrap(), TargetKind::Activity);
        assert_matches!(attendance_target_kind("User"), Err(EventHubError::Validation(_)));
        assert_matches!(attendance_target_kind("Ticket"), Err(EventHubError::Validation(_)));
    }
}
