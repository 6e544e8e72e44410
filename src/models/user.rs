//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audit::AuditFields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Operator,
    #[default]
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Permissions {
    pub is_assistant: bool,
    pub is_operator: bool,
}

/// Stored user document. Use [`UserView`] for anything sent to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default)]
    pub tickets: Vec<Uuid>,
    pub email: String,
    pub phone: Option<String>,
    pub last_session: DateTime<Utc>,
    pub password_hash: String,
    #[serde(default)]
    pub verified: bool,
    pub verify_number: Option<u32>,
    #[serde(default)]
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub audit: AuditFields,
}

/// User as exposed by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    pub permissions: Permissions,
    pub tickets: Vec<Uuid>,
    pub email: String,
    pub phone: Option<String>,
    pub last_session: DateTime<Utc>,
    pub verified: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            role: user.role,
            permissions: user.permissions,
            tickets: user.tickets,
            email: user.email,
            phone: user.phone,
            last_session: user.last_session,
            verified: user.verified,
            is_deleted: user.is_deleted,
            created_at: user.created_at,
            audit: user.audit,
        }
    }
}

/// Name and email, embedded where events list their operators and assistants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsPatch {
    pub is_assistant: Option<bool>,
    pub is_operator: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminUpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub permissions: Option<PermissionsPatch>,
}

/// Returned by registration, login and profile updates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub token: String,
}

impl Permissions {
    pub fn merge(self, patch: &PermissionsPatch) -> Self {
        Self {
            is_assistant: patch.is_assistant.unwrap_or(self.is_assistant),
            is_operator: patch.is_operator.unwrap_or(self.is_operator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_hides_secrets() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ana".into(),
            role: Role::User,
            permissions: Permissions::default(),
            tickets: vec![],
            email: "ana@example.com".into(),
            phone: None,
            last_session: Utc::now(),
            password_hash: "salt$digest".into(),
            verified: false,
            verify_number: Some(123456),
            is_deleted: false,
            created_at: Utc::now(),
            audit: AuditFields::default(),
        };

        let json = serde_json::to_value(UserView::from(user)).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("verifyNumber").is_none());
        assert_eq!(json["changedType"], "create");
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn test_permissions_merge() {
        let merged = Permissions::default().merge(&PermissionsPatch {
            is_assistant: Some(true),
            is_operator: None,
        });
        assert!(merged.is_assistant);
        assert!(!merged.is_operator);
    }
}
