//! Main configuration service
//!
//! Branding shown by every client: titles, colors, contact details and the
//! application logo. The document is created with defaults on first access.

use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::audit::Auditor;
use super::event::validate_colors;
use super::permissions::{require_admin, Actor};
use super::storage::{ObjectStore, UploadKind, UploadedFile};
use crate::config::UploadLimits;
use crate::database::DatabaseService;
use crate::models::{ChangeType, MainConfig, UpdateMainConfigRequest, WithHistory};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::non_blank;
use crate::utils::logging::log_admin_action;

#[derive(Clone)]
pub struct MainConfigService {
    db: DatabaseService,
    auditor: Auditor,
    objects: Arc<dyn ObjectStore>,
    limits: UploadLimits,
}

impl std::fmt::Debug for MainConfigService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainConfigService").finish_non_exhaustive()
    }
}

impl MainConfigService {
    pub fn new(db: DatabaseService, auditor: Auditor, objects: Arc<dyn ObjectStore>, limits: UploadLimits) -> Self {
        Self {
            db,
            auditor,
            objects,
            limits,
        }
    }

    /// Current configuration, created on first access
    async fn current(&self, actor: Option<Uuid>) -> Result<MainConfig> {
        let (config, created) = self.db.main_config.get_or_create(actor).await?;
        if created {
            self.auditor.record(config.id, actor, ChangeType::Create).await?;
            info!("Main configuration created with defaults");
        }
        Ok(config)
    }

    pub async fn get(&self) -> Result<WithHistory<MainConfig>> {
        let config = self.current(None).await?;
        self.auditor.with_history(config.id, config).await
    }

    /// Admin only. Blank text fields keep their current value.
    pub async fn update(&self, actor: &Actor, mut request: UpdateMainConfigRequest) -> Result<WithHistory<MainConfig>> {
        require_admin(actor)?;
        validate_colors(&request.colors())?;

        let config = self.current(Some(actor.id)).await?;

        request.title = non_blank(request.title);
        request.subtitle = non_blank(request.subtitle);
        request.welcome = non_blank(request.welcome);
        request.company = non_blank(request.company);
        request.info_mail = non_blank(request.info_mail);
        request.info_phone = non_blank(request.info_phone);

        let updated = self
            .apply(config.id, serde_json::to_value(&request)?, actor, ChangeType::Update)
            .await?;
        log_admin_action(actor.id, "update_main_config", None, None);
        self.auditor.with_history(updated.id, updated).await
    }

    /// Admin only. Returns the new logo URL.
    pub async fn upload_logo(&self, actor: &Actor, file: UploadedFile) -> Result<String> {
        require_admin(actor)?;
        UploadKind::Logo.validate(&file, &self.limits)?;

        let config = self.current(Some(actor.id)).await?;
        let stored = self.objects.store(UploadKind::Logo.folder(), &file).await?;
        self.apply(
            config.id,
            json!({ "logo": stored.url }),
            actor,
            ChangeType::custom("update-logo"),
        )
        .await?;

        log_admin_action(actor.id, "update_main_logo", None, Some(&stored.url));
        Ok(stored.url)
    }

    async fn apply(
        &self,
        config_id: Uuid,
        fields: serde_json::Value,
        actor: &Actor,
        change: ChangeType,
    ) -> Result<MainConfig> {
        let patch = self.auditor.stamped_patch(fields, Some(actor.id), &change)?;
        let updated = self
            .db
            .main_config
            .update(patch)
            .await?
            .ok_or_else(|| EventHubError::not_found("Main configuration", config_id))?;
        self.auditor.record(config_id, Some(actor.id), change).await?;
        Ok(updated)
    }
}
