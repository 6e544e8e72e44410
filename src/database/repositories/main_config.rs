//! Main configuration repository implementation

use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use super::Collection;
use crate::database::store::{collections, DocumentStore};
use crate::models::main_config::MainConfig;
use crate::utils::errors::{EventHubError, Result};

/// The singleton lives under a fixed id
pub const MAIN_CONFIG_ID: Uuid = Uuid::nil();

#[derive(Clone, Debug)]
pub struct MainConfigRepository {
    docs: Collection<MainConfig>,
}

impl MainConfigRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            docs: Collection::new(store, collections::MAIN_CONFIG),
        }
    }

    pub async fn find(&self) -> Result<Option<MainConfig>> {
        self.docs.get(MAIN_CONFIG_ID).await
    }

    /// Load the configuration, creating it with defaults on first access.
    /// The boolean reports whether this call created it.
    pub async fn get_or_create(&self, changed_by: Option<Uuid>) -> Result<(MainConfig, bool)> {
        if let Some(config) = self.find().await? {
            return Ok((config, false));
        }

        let config = MainConfig::with_defaults(MAIN_CONFIG_ID, changed_by);
        match self.docs.insert(MAIN_CONFIG_ID, &config).await {
            Ok(()) => Ok((config, true)),
            // Another request created it first
            Err(EventHubError::Duplicate(_)) => {
                let existing = self
                    .find()
                    .await?
                    .ok_or_else(|| EventHubError::not_found("Main configuration", MAIN_CONFIG_ID))?;
                Ok((existing, false))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn update(&self, fields: Value) -> Result<Option<MainConfig>> {
        self.docs.patch(MAIN_CONFIG_ID, fields).await
    }
}
