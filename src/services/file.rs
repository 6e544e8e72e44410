//! File service implementation
//!
//! Generic uploads owned by a user and optionally attached to an event,
//! an activity or a user profile.

use chrono::Utc;
use serde_json::{json, Map, Value};
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::permissions::{require, require_admin, AccessScope, Actor, Capability};
use super::storage::{ObjectStore, UploadKind, UploadedFile};
use crate::config::UploadLimits;
use crate::database::DatabaseService;
use crate::models::{FileRecord, FileType, FileView, TargetKind, TargetRef, UpdateFileRequest, UploadFileFields};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::non_blank;

/// Combine an optional `(target, targetModel)` pair into a reference
fn target_ref(target: Option<Uuid>, model: Option<&str>) -> Result<Option<TargetRef>> {
    match (target, model.filter(|m| !m.trim().is_empty())) {
        (None, None) => Ok(None),
        (Some(id), Some(model)) => Ok(Some(TargetRef::new(model.parse::<TargetKind>()?, id))),
        _ => Err(EventHubError::validation("Target and target model must be given together")),
    }
}

#[derive(Clone)]
pub struct FileService {
    db: DatabaseService,
    objects: Arc<dyn ObjectStore>,
    limits: UploadLimits,
}

impl std::fmt::Debug for FileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileService").finish_non_exhaustive()
    }
}

impl FileService {
    /// Create a new FileService instance
    pub fn new(db: DatabaseService, objects: Arc<dyn ObjectStore>, limits: UploadLimits) -> Self {
        Self { db, objects, limits }
    }

    /// Store an upload and record its metadata. Files declared as documents
    /// must be PDFs and go to the documents folder.
    pub async fn upload(&self, actor: &Actor, file: UploadedFile, fields: UploadFileFields) -> Result<FileRecord> {
        let target = target_ref(fields.target, fields.target_model.as_deref())?;
        if let Some(target) = target {
            self.db.targets.resolve_active(target).await?;
        }

        let file_type = fields.file_type.unwrap_or_else(|| FileType::from_mime(&file.content_type));
        let kind = match file_type {
            FileType::Document => UploadKind::Document,
            _ => UploadKind::File,
        };
        kind.validate(&file, &self.limits)?;

        let stored = self.objects.store(kind.folder(), &file).await?;
        let now = Utc::now();
        let record = FileRecord {
            id: Uuid::new_v4(),
            location: stored.url,
            title: non_blank(fields.title).or_else(|| non_blank(Some(file.file_name.clone()))),
            description: non_blank(fields.description),
            file_type,
            owner: actor.id,
            target,
            public_id: stored.public_id,
            size: stored.size,
            format: stored.format,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.db.files.create(&record).await {
            if let Err(cleanup) = self.objects.delete(&record.public_id).await {
                warn!(public_id = %record.public_id, error = %cleanup, "Failed to remove orphaned upload");
            }
            return Err(e);
        }

        info!(file_id = %record.id, owner = %actor.id, file_type = ?record.file_type, "File uploaded");
        Ok(record)
    }

    pub async fn list_all(&self, actor: &Actor) -> Result<Vec<FileView>> {
        require_admin(actor)?;
        let files = self.db.files.list_all().await?;
        let files = self.db.targets.retain_active(files, |f| f.target).await?;
        self.views(files).await
    }

    /// Files owned by `owner`, for that user or an admin
    pub async fn by_owner(&self, actor: &Actor, owner: Uuid) -> Result<Vec<FileView>> {
        require(Some(actor), &AccessScope::owned(owner, owner), Capability::Own)?;
        let files = self.db.files.find_by_owner(owner).await?;
        let files = self.db.targets.retain_active(files, |f| f.target).await?;
        self.views(files).await
    }

    /// Files attached to a target. User targets are private to that user.
    pub async fn by_target(&self, actor: &Actor, model: &str, target_id: Uuid) -> Result<Vec<FileView>> {
        let target = TargetRef::new(model.parse::<TargetKind>()?, target_id);
        if target.kind == TargetKind::User {
            require(Some(actor), &AccessScope::owned(target_id, target_id), Capability::Own)?;
        }
        self.db.targets.resolve_active(target).await?;

        let files = self.db.files.find_by_target(target).await?;
        self.views(files).await
    }

    pub async fn get(&self, actor: &Actor, file_id: Uuid) -> Result<FileView> {
        let file = self.owned_file(actor, file_id).await?;
        let mut views = self.views(vec![file]).await?;
        views.pop().ok_or_else(|| EventHubError::not_found("File", file_id))
    }

    pub async fn update(&self, actor: &Actor, file_id: Uuid, request: UpdateFileRequest) -> Result<FileRecord> {
        let file = self.owned_file(actor, file_id).await?;

        let mut fields = Map::new();
        if let Some(title) = non_blank(request.title) {
            fields.insert("title".into(), json!(title));
        }
        if let Some(description) = request.description {
            fields.insert("description".into(), json!(non_blank(Some(description))));
        }
        if let Some(file_type) = request.file_type {
            fields.insert("type".into(), json!(file_type));
        }
        if request.target.is_some() || request.target_model.is_some() {
            let current = file.target;
            let target = target_ref(
                request.target.or(current.map(|t| t.id)),
                request
                    .target_model
                    .as_deref()
                    .or(current.map(|t| t.kind.as_str())),
            )?;
            if let Some(target) = target {
                self.db.targets.resolve_active(target).await?;
                fields.insert("target".into(), json!(target.id));
                fields.insert("targetModel".into(), json!(target.kind));
            }
        }
        fields.insert("updatedAt".into(), json!(Utc::now()));

        self.db
            .files
            .update(file.id, Value::Object(fields))
            .await?
            .ok_or_else(|| EventHubError::not_found("File", file_id))
    }

    /// Remove the record and the stored object
    pub async fn delete(&self, actor: &Actor, file_id: Uuid) -> Result<()> {
        let file = self.owned_file(actor, file_id).await?;

        if !self.objects.delete(&file.public_id).await? {
            warn!(file_id = %file.id, public_id = %file.public_id, "Stored object was already gone");
        }
        self.db.files.delete(file.id).await?;

        info!(file_id = %file.id, actor_id = %actor.id, "File deleted");
        Ok(())
    }

    /// File visible to its owner or an admin, 404 once its target is gone
    async fn owned_file(&self, actor: &Actor, file_id: Uuid) -> Result<FileRecord> {
        let file = self
            .db
            .files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("File", file_id))?;
        if let Some(target) = file.target {
            self.db.targets.resolve_active(target).await?;
        }
        require(Some(actor), &AccessScope::owned(file.id, file.owner), Capability::Own)?;
        Ok(file)
    }

    /// Newest first, with the owner's name
    async fn views(&self, mut files: Vec<FileRecord>) -> Result<Vec<FileView>> {
        files.sort_by_key(|f| Reverse(f.created_at));

        let mut views = Vec::with_capacity(files.len());
        for file in files {
            let owner_name = self.db.users.find_by_id(file.owner).await?.map(|user| user.name);
            views.push(FileView { file, owner_name });
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_target_ref_pairs() {
        let id = Uuid::new_v4();
        assert_eq!(target_ref(None, None).unwrap(), None);
        assert_eq!(target_ref(None, Some("  ")).unwrap(), None);
        assert_eq!(
            target_ref(Some(id), Some("User")).unwrap(),
            Some(TargetRef::new(TargetKind::User, id))
        );
        assert_matches!(target_ref(Some(id), None), Err(EventHubError::Validation(_)));
        assert_matches!(target_ref(None, Some("Event")), Err(EventHubError::Validation(_)));
        assert_matches!(target_ref(Some(id), Some("Ticket")), Err(EventHubError::Validation(_)));
    }
}
