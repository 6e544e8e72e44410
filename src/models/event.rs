//! Event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::activity::Activity;
use super::audit::{AuditFields, HistoryRecord};
use super::calification::{Calification, RatingStats};
use super::user::UserSummary;
use super::witness::Witness;
use super::flexible_date;

pub const DEFAULT_INFO_COLOR: &str = "#000000";
pub const DEFAULT_BG_COLOR: &str = "#FFFFFF";
pub const DEFAULT_STAR_COLOR: &str = "#FFD700";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorRole {
    #[default]
    General,
    Activity,
    Assistant,
}

impl OperatorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorRole::General => "general",
            OperatorRole::Activity => "activity",
            OperatorRole::Assistant => "assistant",
        }
    }
}

/// A user with management rights on an event. `activities` scopes the
/// `activity` role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub user: Uuid,
    #[serde(default)]
    pub role: OperatorRole,
    #[serde(default)]
    pub activities: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub main_image: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub activities: Vec<Uuid>,
    #[serde(default)]
    pub califications: Vec<Uuid>,
    #[serde(default)]
    pub witnesses: Vec<Uuid>,
    #[serde(default)]
    pub assistants: Vec<Uuid>,
    #[serde(default)]
    pub operators: Vec<Operator>,
    pub place: Option<String>,
    pub date_start: Option<DateTime<Utc>>,
    pub time_start: Option<String>,
    pub date_end: Option<DateTime<Utc>>,
    pub time_end: Option<String>,
    pub is_public: bool,
    #[serde(default)]
    pub photos: Vec<String>,
    pub info_color: String,
    pub bg_color: String,
    pub star_color: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl Event {
    pub fn operator(&self, user_id: Uuid) -> Option<&Operator> {
        self.operators.iter().find(|op| op.user == user_id)
    }

    pub fn is_operator(&self, user_id: Uuid) -> bool {
        self.operator(user_id).is_some()
    }

    pub fn is_assistant(&self, user_id: Uuid) -> bool {
        self.assistants.contains(&user_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub place: Option<String>,
    #[serde(default, deserialize_with = "flexible_date::deserialize")]
    pub date_start: Option<DateTime<Utc>>,
    pub time_start: Option<String>,
    #[serde(default, deserialize_with = "flexible_date::deserialize")]
    pub date_end: Option<DateTime<Utc>>,
    pub time_end: Option<String>,
    pub is_public: Option<bool>,
    pub info_color: Option<String>,
    pub bg_color: Option<String>,
    pub star_color: Option<String>,
}

/// Partial update. Serializes to exactly the fields being changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(default, deserialize_with = "flexible_date::deserialize", skip_serializing_if = "Option::is_none")]
    pub date_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    #[serde(default, deserialize_with = "flexible_date::deserialize", skip_serializing_if = "Option::is_none")]
    pub date_end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub star_color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOperatorRequest {
    pub user_id: Option<Uuid>,
    pub role: Option<OperatorRole>,
    #[serde(default)]
    pub activities: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAssistantRequest {
    pub user_id: Option<Uuid>,
}

/// Activity fields embedded in event listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub id: Uuid,
    pub title: String,
    pub date: Option<DateTime<Utc>>,
    pub time: Option<String>,
    pub place: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListItem {
    #[serde(flatten)]
    pub event: EventSummaryFields,
    pub activities: Vec<ActivitySummary>,
}

/// Every event field except the raw activity id list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummaryFields {
    pub id: Uuid,
    pub logo: String,
    pub main_image: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub place: Option<String>,
    pub date_start: Option<DateTime<Utc>>,
    pub time_start: Option<String>,
    pub date_end: Option<DateTime<Utc>>,
    pub time_end: Option<String>,
    pub is_public: bool,
    pub info_color: String,
    pub bg_color: String,
    pub star_color: String,
}

impl From<&Event> for EventSummaryFields {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            logo: event.logo.clone(),
            main_image: event.main_image.clone(),
            title: event.title.clone(),
            subtitle: event.subtitle.clone(),
            description: event.description.clone(),
            place: event.place.clone(),
            date_start: event.date_start,
            time_start: event.time_start.clone(),
            date_end: event.date_end,
            time_end: event.time_end.clone(),
            is_public: event.is_public,
            info_color: event.info_color.clone(),
            bg_color: event.bg_color.clone(),
            star_color: event.star_color.clone(),
        }
    }
}

/// Operator entry with the user populated
#[derive(Debug, Clone, Serialize)]
pub struct OperatorView {
    pub user: Option<UserSummary>,
    pub role: OperatorRole,
    pub activities: Vec<Uuid>,
}

/// Event detail with related documents populated
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: EventSummaryFields,
    pub activities: Vec<Activity>,
    pub califications: Vec<Calification>,
    pub witnesses: Vec<Witness>,
    pub operators: Vec<OperatorView>,
    pub assistants: Vec<UserSummary>,
    pub photos: Vec<String>,
    pub rating_stats: RatingStats,
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
    #[serde(flatten)]
    pub audit: AuditFields,
    pub changed_history: Vec<HistoryRecord>,
}
