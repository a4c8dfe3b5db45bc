//! Calendar events and their expanded occurrences

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::TimeRange;

/// Where a calendar event originates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarSource {
    Local,
    Google,
    Meeting,
}

/// A (possibly recurring) calendar event owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub range: TimeRange,
    /// RFC 5545 recurrence rule, expanded by the server
    pub recurrence_rule: Option<String>,
    pub source: CalendarSource,
    pub meeting_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl CalendarEvent {
    #[inline]
    pub fn is_recurring(&self) -> bool {
        self.recurrence_rule.is_some()
    }
}

/// One concrete instance of a calendar event inside a queried date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarOccurrence {
    pub event_id: Uuid,
    pub title: String,
    pub range: TimeRange,
    pub source: CalendarSource,
    pub meeting_id: Option<Uuid>,
}

/// Group occurrences by the UTC day they start on, each day sorted by start time
pub fn group_by_day(
    occurrences: impl IntoIterator<Item = CalendarOccurrence>,
) -> BTreeMap<NaiveDate, Vec<CalendarOccurrence>> {
    let mut days: BTreeMap<NaiveDate, Vec<CalendarOccurrence>> = BTreeMap::new();
    for occurrence in occurrences {
        days.entry(occurrence.range.start.date_naive())
            .or_default()
            .push(occurrence);
    }
    for list in days.values_mut() {
        list.sort_by_key(|o| (o.range.start, o.event_id));
    }
    days
}
