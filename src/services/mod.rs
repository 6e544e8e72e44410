//! Services module
//!
//! This module contains business logic services

pub mod activity;
pub mod audit;
pub mod auth;
pub mod calification;
pub mod event;
pub mod file;
pub mod main_config;
pub mod permissions;
pub mod storage;
pub mod ticket;
pub mod user;
pub mod witness;

// Re-export commonly used services
pub use activity::ActivityService;
pub use audit::Auditor;
pub use auth::{AuthService, Claims, PasswordHasher, TokenPurpose};
pub use calification::CalificationService;
pub use event::EventService;
pub use file::FileService;
pub use main_config::MainConfigService;
pub use permissions::{Access, AccessScope, Actor, Capability, Grant};
pub use storage::{LocalObjectStore, ObjectStore, StoredObject, UploadKind, UploadedFile};
pub use ticket::TicketService;
pub use user::UserService;
pub use witness::WitnessService;

use std::sync::Arc;
use std::time::Instant;

use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::middleware::rate_limit::{LoginRateLimiter, RateLimitConfig};

/// Service factory for creating and managing all services
#[derive(Clone, Debug)]
pub struct ServiceFactory {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub event_service: EventService,
    pub activity_service: ActivityService,
    pub ticket_service: TicketService,
    pub calification_service: CalificationService,
    pub witness_service: WitnessService,
    pub file_service: FileService,
    pub main_config_service: MainConfigService,
    pub login_limiter: LoginRateLimiter,
    db: DatabaseService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: &Settings, db: DatabaseService, objects: Arc<dyn ObjectStore>) -> Self {
        let auditor = Auditor::new(db.store(), settings.audit.max_history_in_response);
        let auth_service = AuthService::new(settings.auth.clone());
        let limiter = LoginRateLimiter::new(RateLimitConfig::from(&settings.auth));
        let limits = settings.uploads.clone();

        let witness_service = WitnessService::new(db.clone(), auditor.clone());
        let activity_service = ActivityService::new(db.clone(), auditor.clone(), witness_service.clone());

        Self {
            user_service: UserService::new(db.clone(), auth_service.clone(), auditor.clone(), limiter.clone()),
            event_service: EventService::new(db.clone(), auditor.clone(), Arc::clone(&objects), limits.clone()),
            ticket_service: TicketService::new(db.clone(), auditor.clone(), activity_service.clone()),
            calification_service: CalificationService::new(db.clone()),
            file_service: FileService::new(db.clone(), Arc::clone(&objects), limits.clone()),
            main_config_service: MainConfigService::new(db.clone(), auditor, objects, limits),
            auth_service,
            activity_service,
            witness_service,
            login_limiter: limiter,
            db,
        }
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let started = Instant::now();
        let store_error = self.db.health_check().await.err().map(|e| e.to_string());

        ServiceHealthStatus {
            store_healthy: store_error.is_none(),
            store_latency_ms: started.elapsed().as_millis() as u64,
            store_error,
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealthStatus {
    pub store_healthy: bool,
    pub store_latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_error: Option<String>,
}

impl ServiceHealthStatus {
    /// Check if all critical services are healthy
    pub fn is_healthy(&self) -> bool {
        self.store_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if let Some(error) = &self.store_error {
            issues.push(format!("Document store unreachable: {}", error));
        }

        issues
    }
}
