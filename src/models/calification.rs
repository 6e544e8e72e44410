//! Calification (rating) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::target::TargetRef;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calification {
    pub id: Uuid,
    pub calificator: Uuid,
    pub rating: u8,
    pub comment: Option<String>,
    #[serde(flatten)]
    pub target: TargetRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCalificationRequest {
    pub rating: Option<i64>,
    pub comment: Option<String>,
    pub target: Option<Uuid>,
    pub target_model: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCalificationRequest {
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingStats {
    pub total_ratings: usize,
    pub average_rating: f64,
}

impl RatingStats {
    pub fn from_ratings(ratings: impl IntoIterator<Item = u8>) -> Self {
        let (total, sum) = ratings
            .into_iter()
            .fold((0usize, 0u64), |(n, sum), r| (n + 1, sum + u64::from(r)));

        let average = if total == 0 {
            0.0
        } else {
            crate::utils::helpers::round_one_decimal(sum as f64 / total as f64)
        };

        Self {
            total_ratings: total,
            average_rating: average,
        }
    }
}

/// Calification with the author's name populated
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalificationView {
    #[serde(flatten)]
    pub calification: Calification,
    pub calificator_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetCalifications {
    pub califications: Vec<CalificationView>,
    pub stats: RatingStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_stats() {
        let stats = RatingStats::from_ratings([5, 4, 4]);
        assert_eq!(stats.total_ratings, 3);
        assert_eq!(stats.average_rating, 4.3);

        let empty = RatingStats::from_ratings(Vec::new());
        assert_eq!(empty.total_ratings, 0);
        assert_eq!(empty.average_rating, 0.0);
    }
}
