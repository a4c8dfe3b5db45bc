//! Time range value object for meetings and calendar occurrences

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Half-open interval `[start, end)` in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeRange")]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Unchecked wire shape of [`TimeRange`]
#[derive(Deserialize)]
struct RawTimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawTimeRange> for TimeRange {
    type Error = DomainError;

    fn try_from(raw: RawTimeRange) -> DomainResult<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl TimeRange {
    /// Create a range, rejecting empty or inverted intervals
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<Self> {
        if end <= start {
            return Err(DomainError::InvalidTimeRange);
        }
        Ok(Self { start, end })
    }

    /// Length of the range
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Check whether two ranges share any instant
    #[must_use]
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check whether an instant falls inside the range
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}
