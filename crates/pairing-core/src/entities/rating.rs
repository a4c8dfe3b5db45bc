//! Rating entity - feedback left after a meeting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Score one participant gave the other after a meeting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: Uuid,
    pub meeting_id: Uuid,
    pub rater_id: Uuid,
    pub ratee_id: Uuid,
    pub score: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    pub const MIN_SCORE: u8 = 1;
    pub const MAX_SCORE: u8 = 5;

    /// Reject scores outside `1..=5`
    pub fn check_score(score: u8) -> DomainResult<u8> {
        if (Self::MIN_SCORE..=Self::MAX_SCORE).contains(&score) {
            Ok(score)
        } else {
            Err(DomainError::RatingOutOfRange(score))
        }
    }

    /// Average of a set of ratings
    pub fn average<'a>(ratings: impl IntoIterator<Item = &'a Rating>) -> Option<f64> {
        let (sum, count) = ratings
            .into_iter()
            .fold((0u32, 0u32), |(sum, count), r| (sum + u32::from(r.score), count + 1));
        (count > 0).then(|| f64::from(sum) / f64::from(count))
    }
}
