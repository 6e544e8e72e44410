//! Audit trail types shared by every audited entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Precise label stored in the change history
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChangeType {
    Create,
    Update,
    Delete,
    Custom(String),
}

impl ChangeType {
    pub fn custom(label: impl Into<String>) -> Self {
        ChangeType::from(label.into())
    }

    /// Coarse category written to the entity's top-level `changedType`
    pub fn category(&self) -> ChangeCategory {
        match self {
            ChangeType::Create => ChangeCategory::Create,
            ChangeType::Delete => ChangeCategory::Delete,
            ChangeType::Update | ChangeType::Custom(_) => ChangeCategory::Update,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ChangeType::Create => "create",
            ChangeType::Update => "update",
            ChangeType::Delete => "delete",
            ChangeType::Custom(label) => label,
        }
    }
}

impl From<String> for ChangeType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "create" => ChangeType::Create,
            "update" => ChangeType::Update,
            "delete" => ChangeType::Delete,
            _ => ChangeType::Custom(value),
        }
    }
}

impl From<ChangeType> for String {
    fn from(value: ChangeType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeCategory {
    #[default]
    Create,
    Update,
    Delete,
}

/// Last-change fields embedded in User, Event, Activity, Ticket and MainConfig
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFields {
    pub changed_by: Option<Uuid>,
    pub changed_date: DateTime<Utc>,
    pub changed_type: ChangeCategory,
}

impl AuditFields {
    pub fn stamp(actor: Option<Uuid>, change: &ChangeType) -> Self {
        Self {
            changed_by: actor,
            changed_date: Utc::now(),
            changed_type: change.category(),
        }
    }
}

impl Default for AuditFields {
    fn default() -> Self {
        Self::stamp(None, &ChangeType::Create)
    }
}

/// One entry of an entity's change log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub date: DateTime<Utc>,
    pub user: Option<Uuid>,
    pub change_type: ChangeType,
}

impl HistoryRecord {
    pub fn new(user: Option<Uuid>, change_type: ChangeType) -> Self {
        Self {
            date: Utc::now(),
            user,
            change_type,
        }
    }
}

/// An entity together with its change log, as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithHistory<T> {
    #[serde(flatten)]
    pub entity: T,
    pub changed_history: Vec<HistoryRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_type_wire_format() {
        let json = serde_json::to_string(&ChangeType::custom("add-operator")).unwrap();
        assert_eq!(json, "\"add-operator\"");

        let parsed: ChangeType = serde_json::from_str("\"delete\"").unwrap();
        assert_eq!(parsed, ChangeType::Delete);
    }

    #[test]
    fn test_custom_labels_count_as_updates() {
        assert_eq!(ChangeType::custom("update-logo").category(), ChangeCategory::Update);
        assert_eq!(ChangeType::Create.category(), ChangeCategory::Create);
    }
}
