//! Ticket model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audit::{AuditFields, HistoryRecord};
use super::user::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TicketRole {
    #[default]
    #[serde(rename = "assistente")]
    Assistant,
    #[serde(rename = "operador")]
    Operator,
    #[serde(rename = "administrador")]
    Administrator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    #[serde(rename = "type", default)]
    pub ticket_type: i32,
    pub title: String,
    pub event: Uuid,
    #[serde(default)]
    pub role: TicketRole,
    #[serde(default)]
    pub price: f64,
    pub description: Option<String>,
    pub user: Uuid,
    #[serde(default)]
    pub activities: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(flatten)]
    pub audit: AuditFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    #[serde(rename = "type")]
    pub ticket_type: Option<i32>,
    pub title: Option<String>,
    pub event: Option<Uuid>,
    pub role: Option<TicketRole>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub user: Option<Uuid>,
    #[serde(default)]
    pub activities: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ticket_type: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<TicketRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activities: Option<Vec<Uuid>>,
}

/// `{id, title}` reference used when tickets embed their event and activities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleRef {
    pub id: Uuid,
    pub title: String,
}

/// Ticket with user, event and activity references populated
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub ticket_type: i32,
    pub title: String,
    pub event: Option<TitleRef>,
    pub role: TicketRole,
    pub price: f64,
    pub description: Option<String>,
    pub user: Option<UserSummary>,
    pub activities: Vec<TitleRef>,
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
    #[serde(flatten)]
    pub audit: AuditFields,
    pub changed_history: Vec<HistoryRecord>,
}
