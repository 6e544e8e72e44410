//! User service implementation
//!
//! This service handles registration, login, profile management and the
//! admin-only user administration endpoints.

use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::audit::Auditor;
use super::auth::AuthService;
use super::permissions::{require_admin, Actor};
use crate::database::DatabaseService;
use crate::middleware::rate_limit::LoginRateLimiter;
use crate::models::user::{
    AdminUpdateUserRequest, AuthResponse, LoginRequest, RegisterUserRequest, UpdateProfileRequest,
};
use crate::models::{AuditFields, ChangeType, Permissions, Role, User, UserView, WithHistory};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::{
    generate_verify_number, is_strong_password, is_valid_email, non_blank, normalize_email,
};
use crate::utils::logging::{log_admin_action, log_user_action};

const WEAK_PASSWORD: &str = "Password must be at least 6 characters long and contain a letter and a number";

/// User service for managing user operations
#[derive(Clone, Debug)]
pub struct UserService {
    db: DatabaseService,
    auth: AuthService,
    auditor: Auditor,
    limiter: LoginRateLimiter,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(db: DatabaseService, auth: AuthService, auditor: Auditor, limiter: LoginRateLimiter) -> Self {
        Self {
            db,
            auth,
            auditor,
            limiter,
        }
    }

    /// Register a new account. Only an admin caller may choose the role.
    pub async fn register(&self, caller: Option<&Actor>, request: RegisterUserRequest) -> Result<AuthResponse> {
        let (Some(name), Some(email), Some(password)) = (
            non_blank(request.name),
            non_blank(request.email),
            request.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(EventHubError::validation("Please fill in all required fields"));
        };

        if !is_valid_email(&email) {
            return Err(EventHubError::validation("Please provide a valid email"));
        }
        if !is_strong_password(&password) {
            return Err(EventHubError::validation(WEAK_PASSWORD));
        }

        let email = normalize_email(&email);
        if self.db.users.find_by_email(&email).await?.is_some() {
            return Err(EventHubError::Duplicate("User already exists".to_string()));
        }

        let role = match (caller, request.role) {
            (Some(actor), Some(role)) if actor.is_admin() => role,
            _ => Role::User,
        };

        let now = Utc::now();
        let changed_by = caller.map(|a| a.id);
        let user = User {
            id: Uuid::new_v4(),
            name,
            role,
            permissions: Permissions::default(),
            tickets: Vec::new(),
            email,
            phone: non_blank(request.phone),
            last_session: now,
            password_hash: self.auth.hash_password(&password),
            verified: false,
            verify_number: Some(generate_verify_number()),
            is_deleted: false,
            created_at: now,
            audit: AuditFields::stamp(changed_by, &ChangeType::Create),
        };

        self.db.users.create(&user).await?;
        self.auditor.record(user.id, changed_by, ChangeType::Create).await?;
        info!(user_id = %user.id, role = ?user.role, "User registered");

        Ok(AuthResponse {
            token: self.auth.generate_token(user.id)?,
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            permissions: None,
            phone: None,
        })
    }

    /// Authenticate with email and password
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse> {
        let (Some(email), Some(password)) = (non_blank(request.email), request.password) else {
            return Err(EventHubError::validation("Please provide email and password"));
        };

        self.limiter.check_rate_limit(&email)?;

        let user = self
            .db
            .users
            .find_by_email(&normalize_email(&email))
            .await?
            .filter(|user| !user.is_deleted);

        let user = match user {
            Some(user) if self.auth.verify_password(&password, &user.password_hash) => user,
            _ => {
                let status = self.limiter.get_rate_limit_status(&email);
                warn!(
                    email = %normalize_email(&email),
                    remaining_attempts = status.remaining_requests,
                    locked = status.is_limited(),
                    "Failed login attempt"
                );
                return Err(EventHubError::Unauthorized("Invalid email or password".to_string()));
            }
        };

        self.limiter.reset(&email);
        self.db
            .users
            .update(user.id, json!({ "lastSession": Utc::now() }))
            .await?;
        log_user_action(user.id, "login", None);

        Ok(AuthResponse {
            token: self.auth.generate_token(user.id)?,
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            permissions: Some(user.permissions),
            phone: None,
        })
    }

    /// The caller's own profile
    pub async fn profile(&self, actor: &Actor) -> Result<WithHistory<UserView>> {
        let user = self.active_user(actor.id).await?;
        self.auditor.with_history(user.id, UserView::from(user)).await
    }

    /// Update name, email, phone or password of the caller
    pub async fn update_profile(&self, actor: &Actor, request: UpdateProfileRequest) -> Result<AuthResponse> {
        let user = self.active_user(actor.id).await?;
        let mut fields = Map::new();

        if let Some(name) = non_blank(request.name) {
            fields.insert("name".into(), json!(name));
        }
        if let Some(email) = non_blank(request.email) {
            fields.insert("email".into(), json!(self.checked_email(&email, user.id).await?));
        }
        if let Some(phone) = non_blank(request.phone) {
            fields.insert("phone".into(), json!(phone));
        }
        if let Some(password) = request.password.filter(|p| !p.is_empty()) {
            if !is_strong_password(&password) {
                return Err(EventHubError::validation(WEAK_PASSWORD));
            }
            fields.insert("passwordHash".into(), json!(self.auth.hash_password(&password)));
        }

        let updated = self.apply_update(user.id, Value::Object(fields), actor.id).await?;
        log_user_action(actor.id, "update_profile", None);

        Ok(AuthResponse {
            token: self.auth.generate_token(updated.id)?,
            id: updated.id,
            name: updated.name,
            email: updated.email,
            role: updated.role,
            permissions: None,
            phone: updated.phone,
        })
    }

    pub async fn list(&self, actor: &Actor) -> Result<Vec<UserView>> {
        require_admin(actor)?;
        let users = self.db.users.list_active().await?;
        debug!(count = users.len(), "Listed users");
        Ok(users.into_iter().map(UserView::from).collect())
    }

    pub async fn get(&self, actor: &Actor, user_id: Uuid) -> Result<WithHistory<UserView>> {
        require_admin(actor)?;
        let user = self.active_user(user_id).await?;
        self.auditor.with_history(user.id, UserView::from(user)).await
    }

    /// Admin update, including role and permission flags
    pub async fn admin_update(
        &self,
        actor: &Actor,
        user_id: Uuid,
        request: AdminUpdateUserRequest,
    ) -> Result<WithHistory<UserView>> {
        require_admin(actor)?;
        let user = self.active_user(user_id).await?;
        let mut fields = Map::new();

        if let Some(name) = non_blank(request.name) {
            fields.insert("name".into(), json!(name));
        }
        if let Some(email) = non_blank(request.email) {
            fields.insert("email".into(), json!(self.checked_email(&email, user.id).await?));
        }
        if let Some(phone) = non_blank(request.phone) {
            fields.insert("phone".into(), json!(phone));
        }
        if let Some(role) = request.role {
            fields.insert("role".into(), json!(role));
        }
        if let Some(patch) = request.permissions.as_ref() {
            fields.insert("permissions".into(), serde_json::to_value(user.permissions.merge(patch))?);
        }

        let updated = self.apply_update(user.id, Value::Object(fields), actor.id).await?;
        log_admin_action(actor.id, "update_user", Some(&user_id.to_string()), None);
        self.auditor.with_history(updated.id, UserView::from(updated)).await
    }

    /// Soft delete
    pub async fn delete(&self, actor: &Actor, user_id: Uuid) -> Result<()> {
        require_admin(actor)?;
        let user = self.active_user(user_id).await?;

        let patch = self.auditor.stamped_patch(
            json!({ "isDeleted": true }),
            Some(actor.id),
            &ChangeType::Delete,
        )?;
        self.db.users.update(user.id, patch).await?;
        self.auditor.record(user.id, Some(actor.id), ChangeType::Delete).await?;
        log_admin_action(actor.id, "delete_user", Some(&user_id.to_string()), None);
        Ok(())
    }

    async fn active_user(&self, user_id: Uuid) -> Result<User> {
        self.db
            .users
            .find_active(user_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("User", user_id))
    }

    /// Normalized email, provided no other account uses it
    async fn checked_email(&self, email: &str, owner: Uuid) -> Result<String> {
        if !is_valid_email(email) {
            return Err(EventHubError::validation("Please provide a valid email"));
        }
        let email = normalize_email(email);
        match self.db.users.find_by_email(&email).await? {
            Some(other) if other.id != owner => Err(EventHubError::Duplicate("Email already in use".to_string())),
            _ => Ok(email),
        }
    }

    async fn apply_update(&self, user_id: Uuid, fields: Value, actor_id: Uuid) -> Result<User> {
        let patch = self.auditor.stamped_patch(fields, Some(actor_id), &ChangeType::Update)?;
        let updated = self
            .db
            .users
            .update(user_id, patch)
            .await?
            .ok_or_else(|| EventHubError::not_found("User", user_id))?;
        self.auditor.record(user_id, Some(actor_id), ChangeType::Update).await?;
        Ok(updated)
    }
}
