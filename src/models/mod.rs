//! Data models module
//!
//! This module contains all data structures used throughout the application.
//! Documents are stored and served as camelCase JSON.

pub mod activity;
pub mod audit;
pub mod calification;
pub mod event;
pub mod file;
pub mod main_config;
pub mod target;
pub mod ticket;
pub mod user;
pub mod witness;

// Re-export commonly used models
pub use activity::{
    Activity, AddWitnessRequest, AvailableSeats, CreateActivityRequest, SeatChangeResponse, UpdateActivityRequest,
};
pub use audit::{AuditFields, ChangeCategory, ChangeType, HistoryRecord, WithHistory};
pub use calification::{
    Calification, CalificationView, CreateCalificationRequest, RatingStats, TargetCalifications,
    UpdateCalificationRequest,
};
pub use event::{
    ActivitySummary, AddAssistantRequest, AddOperatorRequest, CreateEventRequest, Event, EventDetail, EventListItem,
    EventSummaryFields, Operator, OperatorRole, OperatorView, UpdateEventRequest,
};
pub use file::{FileRecord, FileType, FileView, UpdateFileRequest, UploadFileFields};
pub use main_config::{MainConfig, UpdateMainConfigRequest};
pub use target::{TargetKind, TargetRef};
pub use ticket::{CreateTicketRequest, Ticket, TicketRole, TicketView, TitleRef, UpdateTicketRequest};
pub use user::{Permissions, Role, User, UserSummary, UserView};
pub use witness::{CreateWitnessRequest, Witness, WitnessView};

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC)
pub(crate) mod flexible_date {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
            return Ok(None);
        };

        if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(Some(ts.with_timezone(&Utc)));
        }

        NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Some(dt.and_utc()))
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw)))
    }
}
