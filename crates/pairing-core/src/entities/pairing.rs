//! Pairing entity and the settings/result types of the server-side pairing algorithm

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::User;

/// Lifecycle of a pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingStatus {
    Active,
    Completed,
    Cancelled,
}

/// Relationship between two users produced by the pairing algorithm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pairing {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_a: User,
    pub user_b: User,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub status: PairingStatus,
}

impl Pairing {
    /// Check whether the user is one of the two paired users
    #[inline]
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user_a.id == user_id || self.user_b.id == user_id
    }

    /// The other user of the pairing, if `user_id` is part of it
    pub fn partner_of(&self, user_id: Uuid) -> Option<&User> {
        if self.user_a.id == user_id {
            Some(&self.user_b)
        } else if self.user_b.id == user_id {
            Some(&self.user_a)
        } else {
            None
        }
    }

    /// Active and still inside its period
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.status == PairingStatus::Active && now < self.period_end
    }
}

/// The two integers edited on the algorithm settings screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingAlgorithmSettings {
    pub period_length_days: i32,
    pub random_seed: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Outcome of `executePairingAlgorithm`, displayed verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmRunResult {
    pub pairs_created: i64,
    pub users_unpaired: i64,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl AlgorithmRunResult {
    /// One-line summary for a toast
    pub fn summary(&self) -> String {
        let mut line = format!(
            "Created {} pairs, {} users left unpaired",
            self.pairs_created, self.users_unpaired
        );
        if !self.warnings.is_empty() {
            line.push_str(&format!(" ({} warnings)", self.warnings.len()));
        }
        line
    }
}
