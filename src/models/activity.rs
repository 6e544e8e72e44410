//! Activity model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audit::AuditFields;
use super::flexible_date;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,
    #[serde(default)]
    pub ticket_type: i32,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub organization: Option<String>,
    #[serde(default)]
    pub califications: Vec<Uuid>,
    #[serde(default)]
    pub witnesses: Vec<Uuid>,
    pub date: Option<DateTime<Utc>>,
    pub time: Option<String>,
    pub place: Option<String>,
    pub info_color: String,
    pub bg_color: String,
    pub star_color: String,
    /// Zero means unlimited
    #[serde(default)]
    pub seats: u32,
    #[serde(default)]
    pub taken_seats: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl Activity {
    pub fn is_unlimited(&self) -> bool {
        self.seats == 0
    }

    pub fn is_available(&self) -> bool {
        self.is_unlimited() || self.taken_seats < self.seats
    }

    pub fn available_seats(&self) -> AvailableSeats {
        if self.is_unlimited() {
            AvailableSeats::Unlimited
        } else {
            AvailableSeats::Count(self.seats.saturating_sub(self.taken_seats))
        }
    }
}

/// A seat count, or the string `"unlimited"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailableSeats {
    Count(u32),
    Unlimited,
}

impl Serialize for AvailableSeats {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AvailableSeats::Count(n) => serializer.serialize_u32(*n),
            AvailableSeats::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatChangeResponse {
    pub message: String,
    pub taken_seats: u32,
    pub available_seats: AvailableSeats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityRequest {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "flexible_date::deserialize")]
    pub date: Option<DateTime<Utc>>,
    pub time: Option<String>,
    pub place: Option<String>,
    pub ticket_type: Option<i32>,
    pub info_color: Option<String>,
    pub bg_color: Option<String>,
    pub star_color: Option<String>,
    pub seats: Option<i64>,
}

/// Partial update. Serializes to exactly the fields being changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActivityRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "flexible_date::deserialize", skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_type: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub star_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWitnessRequest {
    pub user_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn activity(seats: u32, taken_seats: u32) -> Activity {
        Activity {
            id: Uuid::new_v4(),
            ticket_type: 0,
            title: "Talk".into(),
            subtitle: None,
            description: None,
            organization: None,
            califications: vec![],
            witnesses: vec![],
            date: None,
            time: None,
            place: None,
            info_color: "#000000".into(),
            bg_color: "#FFFFFF".into(),
            star_color: "#FFD700".into(),
            seats,
            taken_seats,
            created_at: Utc::now(),
            is_deleted: false,
            audit: AuditFields::default(),
        }
    }

    #[test]
    fn test_availability() {
        assert!(activity(0, 500).is_available());
        assert!(activity(2, 1).is_available());
        assert!(!activity(1, 1).is_available());
    }

    #[test]
    fn test_available_seats_serialization() {
        assert_eq!(serde_json::to_value(activity(5, 2).available_seats()).unwrap(), json!(3));
        assert_eq!(serde_json::to_value(activity(0, 2).available_seats()).unwrap(), json!("unlimited"));
    }
}
