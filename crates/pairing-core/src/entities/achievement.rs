//! Achievement entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Badge a user can earn; unearned achievements are listed as locked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub code: String,
    pub title: String,
    pub description: String,
    pub earned_at: Option<DateTime<Utc>>,
}

impl Achievement {
    #[inline]
    pub fn is_earned(&self) -> bool {
        self.earned_at.is_some()
    }
}
