//! Error handling for EventHub
//!
//! This module defines the main error type used throughout the application
//! and maps every variant onto the HTTP status returned to API clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};

/// Main error type for EventHub application
#[derive(Error, Debug)]
pub enum EventHubError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Document store error: {0}")]
    Storage(String),

    #[error("Object storage error: {0}")]
    ObjectStorage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("No seats available for activity: {activity}")]
    SeatsUnavailable { activity: String },

    #[error("No occupied seats to release")]
    NoOccupiedSeats,

    #[error("Too many attempts, try again later")]
    RateLimitExceeded,

    #[error("Invalid token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid upload: {0}")]
    Upload(#[from] axum::extract::multipart::MultipartError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias for EventHub operations
pub type Result<T> = std::result::Result<T, EventHubError>;

impl From<axum::extract::rejection::JsonRejection> for EventHubError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        EventHubError::Validation(rejection.body_text())
    }
}

impl From<axum::extract::rejection::PathRejection> for EventHubError {
    fn from(rejection: axum::extract::rejection::PathRejection) -> Self {
        EventHubError::Validation(rejection.body_text())
    }
}

impl From<axum::extract::multipart::MultipartRejection> for EventHubError {
    fn from(rejection: axum::extract::multipart::MultipartRejection) -> Self {
        EventHubError::Validation(rejection.body_text())
    }
}

impl EventHubError {
    /// Shorthand for a missing (or soft-deleted) entity
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        EventHubError::NotFound { entity, id: id.to_string() }
    }

    /// Shorthand for a failed input check
    pub fn validation(message: impl Into<String>) -> Self {
        EventHubError::Validation(message.into())
    }

    /// Shorthand for an authenticated caller lacking a relationship to the target
    pub fn forbidden(message: impl Into<String>) -> Self {
        EventHubError::PermissionDenied(message.into())
    }

    /// HTTP status reported for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            EventHubError::Validation(_)
            | EventHubError::Duplicate(_)
            | EventHubError::SeatsUnavailable { .. }
            | EventHubError::NoOccupiedSeats
            | EventHubError::Upload(_) => StatusCode::BAD_REQUEST,
            EventHubError::Unauthorized(_) | EventHubError::Token(_) => StatusCode::UNAUTHORIZED,
            EventHubError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            EventHubError::NotFound { .. } => StatusCode::NOT_FOUND,
            EventHubError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            EventHubError::Database(_)
            | EventHubError::Migration(_)
            | EventHubError::Storage(_)
            | EventHubError::ObjectStorage(_)
            | EventHubError::Config(_)
            | EventHubError::ConfigLoad(_)
            | EventHubError::Serialization(_)
            | EventHubError::Io(_)
            | EventHubError::UrlParse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the caller caused this error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EventHubError::Database(_) => ErrorSeverity::Critical,
            EventHubError::Migration(_) => ErrorSeverity::Critical,
            EventHubError::Config(_) | EventHubError::ConfigLoad(_) => ErrorSeverity::Critical,
            EventHubError::PermissionDenied(_) => ErrorSeverity::Warning,
            EventHubError::Unauthorized(_) | EventHubError::Token(_) => ErrorSeverity::Warning,
            EventHubError::RateLimitExceeded => ErrorSeverity::Warning,
            _ if self.is_client_error() => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// Message exposed to API clients. Server-side failures are not described.
    pub fn public_message(&self) -> String {
        if self.is_client_error() {
            match self {
                EventHubError::Token(_) => "Not authorized, invalid token".to_string(),
                other => other.to_string(),
            }
        } else {
            "Internal server error".to_string()
        }
    }
}

impl IntoResponse for EventHubError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self.severity() {
            ErrorSeverity::Info => info!(status = status.as_u16(), error = %self, "Request rejected"),
            ErrorSeverity::Warning => warn!(status = status.as_u16(), error = %self, "Request rejected"),
            ErrorSeverity::Error | ErrorSeverity::Critical => {
                error!(status = status.as_u16(), severity = %self.severity(), error = %self, "Request failed")
            }
        }

        (status, Json(json!({ "message": self.public_message() }))).into_response()
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(EventHubError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(EventHubError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(EventHubError::forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(EventHubError::not_found("Event", "1").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(EventHubError::NoOccupiedSeats.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            EventHubError::SeatsUnavailable { activity: "Talk".into() }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(EventHubError::Storage("boom".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_public_message_hides_internal_detail() {
        let err = EventHubError::Storage("connection refused on 10.0.0.3".into());
        assert_eq!(err.public_message(), "Internal server error");

        let err = EventHubError::not_found("Event", "abc");
        assert_eq!(err.public_message(), "Event not found");
    }

    #[test]
    fn test_severity() {
        assert_eq!(EventHubError::forbidden("no").severity(), ErrorSeverity::Warning);
        assert_eq!(EventHubError::validation("bad").severity(), ErrorSeverity::Info);
        assert_eq!(EventHubError::Config("bad".into()).severity(), ErrorSeverity::Critical);
        assert_eq!(EventHubError::Io(std::io::Error::other("disk")).severity(), ErrorSeverity::Error);
    }
}
