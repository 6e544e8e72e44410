//! Witness model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::target::TargetRef;
use super::user::UserSummary;

/// Attendance record linking a user to an event or activity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Witness {
    pub id: Uuid,
    pub witness: Uuid,
    #[serde(flatten)]
    pub target: TargetRef,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWitnessRequest {
    pub witness: Option<Uuid>,
    pub target: Option<Uuid>,
    pub target_model: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WitnessView {
    #[serde(flatten)]
    pub record: Witness,
    pub witness_user: Option<UserSummary>,
}
