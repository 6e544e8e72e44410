//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured before the
//! server starts accepting requests.

use crate::utils::errors::{EventHubError, Result};
use super::{Settings, StoreBackend};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const MIN_JWT_SECRET_BYTES: usize = 16;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_auth_config(&settings.auth)?;
    validate_storage_config(&settings.storage)?;
    validate_upload_limits(&settings.uploads)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate HTTP server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(EventHubError::Config("Server host is required".to_string()));
    }

    if !config.api_prefix.is_empty() && !config.api_prefix.starts_with('/') {
        return Err(EventHubError::Config(format!(
            "API prefix must start with '/': {}",
            config.api_prefix
        )));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.backend == StoreBackend::Postgres && config.url.is_empty() {
        return Err(EventHubError::Config(
            "Database URL is required for the postgres backend".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(EventHubError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(EventHubError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate token and login settings
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.jwt_secret.is_empty() {
        return Err(EventHubError::Config("JWT secret is required".to_string()));
    }

    if config.jwt_secret.len() < MIN_JWT_SECRET_BYTES {
        return Err(EventHubError::Config(format!(
            "JWT secret must be at least {} bytes",
            MIN_JWT_SECRET_BYTES
        )));
    }

    if config.token_ttl_days <= 0 {
        return Err(EventHubError::Config(
            "Token lifetime must be at least one day".to_string()
        ));
    }

    if config.login_max_attempts == 0 || config.login_window_seconds == 0 {
        return Err(EventHubError::Config(
            "Login rate limit attempts and window must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate object storage configuration
fn validate_storage_config(config: &super::StorageConfig) -> Result<()> {
    if config.upload_dir.is_empty() {
        return Err(EventHubError::Config("Upload directory is required".to_string()));
    }

    url::Url::parse(&config.public_base_url).map_err(|e| {
        EventHubError::Config(format!(
            "Invalid public base URL {}: {}",
            config.public_base_url, e
        ))
    })?;

    Ok(())
}

/// Validate upload size limits
fn validate_upload_limits(config: &super::UploadLimits) -> Result<()> {
    let limits = [
        ("logo_max_bytes", config.logo_max_bytes),
        ("photo_max_bytes", config.photo_max_bytes),
        ("file_max_bytes", config.file_max_bytes),
        ("max_photos_per_request", config.max_photos_per_request),
    ];

    if let Some((name, _)) = limits.iter().find(|(_, value)| *value == 0) {
        return Err(EventHubError::Config(format!(
            "Upload limit {} must be greater than 0",
            name
        )));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if !LOG_LEVELS.contains(&config.level.to_lowercase().as_str()) {
        return Err(EventHubError::Config(format!(
            "Invalid log level: {}. Valid levels: {}",
            config.level,
            LOG_LEVELS.join(", ")
        )));
    }

    if config.file_path.is_empty() {
        return Err(EventHubError::Config("Log file path is required".to_string()));
    }

    Ok(())
}
