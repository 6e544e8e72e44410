//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub uploads: UploadLimits,
    pub logging: LoggingConfig,
    pub audit: AuditConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_prefix: String,
    pub cors_permissive: bool,
}

/// Which document store implementation backs the repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Token and login configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub login_max_attempts: u32,
    pub login_window_seconds: u64,
}

/// Object storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub upload_dir: String,
    pub public_base_url: String,
}

/// Upload size limits in bytes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadLimits {
    pub logo_max_bytes: usize,
    pub photo_max_bytes: usize,
    pub file_max_bytes: usize,
    pub max_photos_per_request: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
    pub json: bool,
}

/// Change history configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuditConfig {
    /// Most recent records embedded in responses; `None` embeds everything
    pub max_history_in_response: Option<usize>,
}

impl Settings {
    /// Load settings from configuration file and environment variables.
    ///
    /// Values missing from both sources fall back to [`Settings::default`].
    pub fn new() -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("EVENTHUB")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::EventHubError> {
        super::validation::validate_settings(self)
    }

    /// Socket address string for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                api_prefix: "/api".to_string(),
                cors_permissive: true,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Memory,
                url: "postgresql://localhost/eventhub".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            auth: AuthConfig {
                jwt_secret: "change-me-in-production-please".to_string(),
                token_ttl_days: 30,
                login_max_attempts: 10,
                login_window_seconds: 60,
            },
            storage: StorageConfig {
                upload_dir: "./uploads".to_string(),
                public_base_url: "http://localhost:5000/uploads".to_string(),
            },
            uploads: UploadLimits {
                logo_max_bytes: 2 * 1024 * 1024,
                photo_max_bytes: 5 * 1024 * 1024,
                file_max_bytes: 10 * 1024 * 1024,
                max_photos_per_request: 10,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "./logs".to_string(),
                json: false,
            },
            audit: AuditConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.auth.token_ttl_days, 30);
        assert_eq!(settings.uploads.logo_max_bytes, 2 * 1024 * 1024);
        assert_eq!(settings.bind_address(), "0.0.0.0:5000");
    }

    #[test]
    fn test_backend_deserializes_lowercase() {
        let backend: StoreBackend = serde_json::from_str("\"postgres\"").unwrap();
        assert_eq!(backend, StoreBackend::Postgres);
    }
}
