//! Calification service implementation
//!
//! Ratings from 1 to 5 left by participants of an event or an activity,
//! with per-target statistics computed at read time.

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use super::permissions::{require, AccessScope, Actor, Capability};
use super::witness::attendance_target_kind;
use crate::database::{DatabaseService, ResolvedTarget};
use crate::models::{
    Calification, CalificationView, CreateCalificationRequest, RatingStats, TargetCalifications, TargetKind,
    TargetRef, UpdateCalificationRequest,
};
use crate::utils::errors::{EventHubError, Result};

const MIN_RATING: i64 = 1;
const MAX_RATING: i64 = 5;

fn checked_rating(rating: i64) -> Result<u8> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(rating as u8)
    } else {
        Err(EventHubError::validation("Rating must be between 1 and 5"))
    }
}

#[derive(Clone, Debug)]
pub struct CalificationService {
    db: DatabaseService,
}

impl CalificationService {
    /// Create a new CalificationService instance
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    pub async fn create(&self, actor: &Actor, request: CreateCalificationRequest) -> Result<Calification> {
        let (Some(rating), Some(target_id), Some(model)) = (request.rating, request.target, request.target_model) else {
            return Err(EventHubError::validation("Rating, target and target model are required"));
        };
        let rating = checked_rating(rating)?;
        let target = TargetRef::new(attendance_target_kind(&model)?, target_id);

        let resolved = self.db.targets.resolve_active(target).await?;
        if !actor.is_admin() && !self.is_participant(actor.id, &resolved).await? {
            return Err(EventHubError::forbidden(format!(
                "You cannot rate this {} because you did not take part in it",
                target.kind.as_str().to_lowercase()
            )));
        }

        if self
            .db
            .califications
            .find_by_author_and_target(actor.id, target)
            .await?
            .is_some()
        {
            return Err(EventHubError::Duplicate(format!(
                "You have already rated this {}",
                target.kind.as_str().to_lowercase()
            )));
        }

        let now = Utc::now();
        let calification = Calification {
            id: Uuid::new_v4(),
            calificator: actor.id,
            rating,
            comment: request.comment,
            target,
            created_at: now,
            updated_at: now,
        };
        self.db.califications.create(&calification).await?;

        match target.kind {
            TargetKind::Event => self.db.events.add_calification(target.id, calification.id).await?,
            _ => self.db.activities.add_calification(target.id, calification.id).await?,
        };

        info!(
            calification_id = %calification.id,
            user_id = %actor.id,
            target = %target.kind,
            target_id = %target.id,
            rating = rating,
            "Calification created"
        );
        Ok(calification)
    }

    /// Event participants are its assistants and witnesses; activity
    /// participants are its witnesses and the parent event's assistants.
    async fn is_participant(&self, user_id: Uuid, target: &ResolvedTarget) -> Result<bool> {
        match target {
            ResolvedTarget::Event(event) => Ok(event.is_assistant(user_id)
                || self
                    .db
                    .witnesses
                    .find_by_user_and_target(user_id, TargetRef::event(event.id))
                    .await?
                    .is_some()),
            ResolvedTarget::Activity(activity) => {
                if self
                    .db
                    .witnesses
                    .find_by_user_and_target(user_id, TargetRef::activity(activity.id))
                    .await?
                    .is_some()
                {
                    return Ok(true);
                }
                let event = self.db.targets.parent_event(activity.id).await?;
                Ok(event.is_assistant(user_id))
            }
            ResolvedTarget::User(_) => Ok(false),
        }
    }

    /// Ratings of a target with their statistics
    pub async fn by_target(&self, actor: Option<&Actor>, model: &str, target_id: Uuid) -> Result<TargetCalifications> {
        let target = TargetRef::new(attendance_target_kind(model)?, target_id);
        let resolved = self.db.targets.resolve_active(target).await?;
        if let Some(event) = self.db.targets.governing_event(&resolved).await? {
            require(actor, &AccessScope::event(&event), Capability::View)?;
        }

        let califications = self.db.califications.find_by_target(target).await?;
        let stats = RatingStats::from_ratings(califications.iter().map(|c| c.rating));
        debug!(target_id = %target_id, total = stats.total_ratings, "Loaded califications");

        Ok(TargetCalifications {
            califications: self.views(califications).await?,
            stats,
        })
    }

    pub async fn get(&self, actor: Option<&Actor>, calification_id: Uuid) -> Result<CalificationView> {
        let calification = self.find(calification_id).await?;
        self.require_target_visible(actor, calification.target).await?;

        let mut views = self.views(vec![calification]).await?;
        views
            .pop()
            .ok_or_else(|| EventHubError::not_found("Calification", calification_id))
    }

    /// Change rating or comment; author or admin
    pub async fn update(
        &self,
        actor: &Actor,
        calification_id: Uuid,
        request: UpdateCalificationRequest,
    ) -> Result<Calification> {
        let calification = self.find(calification_id).await?;
        self.db.targets.resolve_active(calification.target).await?;
        require(
            Some(actor),
            &AccessScope::owned(calification.id, calification.calificator),
            Capability::Own,
        )?;

        let mut fields = serde_json::Map::new();
        if let Some(rating) = request.rating {
            fields.insert("rating".into(), json!(checked_rating(rating)?));
        }
        if let Some(comment) = request.comment {
            fields.insert("comment".into(), json!(comment));
        }
        fields.insert("updatedAt".into(), json!(Utc::now()));

        self.db
            .califications
            .update(calification.id, serde_json::Value::Object(fields))
            .await?
            .ok_or_else(|| EventHubError::not_found("Calification", calification_id))
    }

    /// Hard delete; author or admin
    pub async fn delete(&self, actor: &Actor, calification_id: Uuid) -> Result<()> {
        let calification = self.find(calification_id).await?;
        self.db.targets.resolve_active(calification.target).await?;
        require(
            Some(actor),
            &AccessScope::owned(calification.id, calification.calificator),
            Capability::Own,
        )?;

        self.db.califications.delete(calification.id).await?;
        let target = calification.target;
        match target.kind {
            TargetKind::Event => self.db.events.remove_calification(target.id, calification.id).await?,
            _ => self.db.activities.remove_calification(target.id, calification.id).await?,
        };

        info!(calification_id = %calification.id, actor_id = %actor.id, "Calification deleted");
        Ok(())
    }

    async fn find(&self, calification_id: Uuid) -> Result<Calification> {
        self.db
            .califications
            .find_by_id(calification_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Calification", calification_id))
    }

    /// 404 when the target is gone, 403 when its event is private to the caller
    async fn require_target_visible(&self, actor: Option<&Actor>, target: TargetRef) -> Result<()> {
        let resolved = self.db.targets.resolve_active(target).await?;
        if let Some(event) = self.db.targets.governing_event(&resolved).await? {
            require(actor, &AccessScope::event(&event), Capability::View)?;
        }
        Ok(())
    }

    async fn views(&self, califications: Vec<Calification>) -> Result<Vec<CalificationView>> {
        let mut views = Vec::with_capacity(califications.len());
        for calification in califications {
            let calificator_name = self
                .db
                .users
                .find_by_id(calification.calificator)
                .await?
                .map(|user| user.name);
            views.push(CalificationView {
                calification,
                calificator_name,
            });
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_range() {
        assert_eq!(checked_rating(1).unwrap(), 1);
        assert_eq!(checked_rating(5).unwrap(), 5);
        assert!(checked_rating(0).is_err());
        assert!(checked_rating(6).is_err());
        assert!(checked_rating(-3).is_err());
    }
}
