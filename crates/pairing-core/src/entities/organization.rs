//! Organization entity and its statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Organization that groups users for pairing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Only visible to admins
    pub invite_code: Option<String>,
    #[serde(default)]
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Aggregate numbers shown on the statistics screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationStatistics {
    pub organization_id: Uuid,
    pub total_users: i64,
    pub active_pairings: i64,
    pub completed_meetings: i64,
    pub pending_meetings: i64,
    pub open_reports: i64,
    pub average_rating: Option<f64>,
}

impl OrganizationStatistics {
    /// Share of meetings that were completed, in percent
    pub fn completion_rate(&self) -> Option<f64> {
        let total = self.completed_meetings + self.pending_meetings;
        if total == 0 {
            None
        } else {
            Some(self.completed_meetings as f64 * 100.0 / total as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_rate() {
        let mut stats = OrganizationStatistics {
            organization_id: Uuid::nil(),
            total_users: 10,
            active_pairings: 5,
            completed_meetings: 3,
            pending_meetings: 1,
            open_reports: 0,
            average_rating: Some(4.5),
        };
        assert_eq!(stats.completion_rate(), Some(75.0));

        stats.completed_meetings = 0;
        stats.pending_meetings = 0;
        assert_eq!(stats.completion_rate(), None);
    }
}
