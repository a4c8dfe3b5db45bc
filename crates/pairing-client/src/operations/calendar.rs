//! Calendar queries and mutations

use chrono::{DateTime, Utc};
use pairing_core::{CalendarEvent, CalendarOccurrence};
use serde::{Deserialize, Serialize};

use super::IdVariables;
use crate::graphql::{Operation, OperationKind};

/// Occurrences of the user's events (recurrences expanded by the server) in a window
pub struct CalendarOccurrences;

#[derive(Debug, Clone, Serialize)]
pub struct CalendarOccurrencesVariables {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarOccurrencesData {
    pub calendar_occurrences: Vec<CalendarOccurrence>,
}

impl Operation for CalendarOccurrences {
    const NAME: &'static str = "CalendarOccurrences";
    const DOCUMENT: &'static str = r"query CalendarOccurrences($start: DateTime!, $end: DateTime!) {
  calendarOccurrences(start: $start, end: $end) {
    eventId title source meetingId
    range { start end }
  }
}";
    const KIND: OperationKind = OperationKind::Query;
    type Variables = CalendarOccurrencesVariables;
    type Data = CalendarOccurrencesData;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventInput {
    pub title: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub recurrence_rule: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateCalendarEventVariables {
    pub input: CalendarEventInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCalendarEventData {
    pub create_calendar_event: CalendarEvent,
}

pub struct CreateCalendarEvent;

impl Operation for CreateCalendarEvent {
    const NAME: &'static str = "CreateCalendarEvent";
    const DOCUMENT: &'static str = r"mutation CreateCalendarEvent($input: CalendarEventInput!) {
  createCalendarEvent(input: $input) {
    id ownerId title description recurrenceRule source meetingId createdAt
    range { start end }
  }
}";
    const KIND: OperationKind = OperationKind::Mutation;
    const INVALIDATES: &'static [&'static str] = &["CalendarOccurrences"];
    type Variables = CreateCalendarEventVariables;
    type Data = CreateCalendarEventData;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCalendarEventData {
    pub delete_calendar_event: bool,
}

pub struct DeleteCalendarEvent;

impl Operation for DeleteCalendarEvent {
    const NAME: &'static str = "DeleteCalendarEvent";
    const DOCUMENT: &'static str = r"mutation DeleteCalendarEvent($id: ID!) {
  deleteCalendarEvent(id: $id)
}";
    const KIND: OperationKind = OperationKind::Mutation;
    const INVALIDATES: &'static [&'static str] = &["CalendarOccurrences"];
    type Variables = IdVariables;
    type Data = DeleteCalendarEventData;
}

/// Import events from Google Calendar with the token obtained through the OAuth handoff
pub struct SyncGoogleCalendar;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncGoogleCalendarVariables {
    pub access_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSyncResult {
    pub imported: i64,
    pub updated: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncGoogleCalendarData {
    pub sync_google_calendar: CalendarSyncResult,
}

impl Operation for SyncGoogleCalendar {
    const NAME: &'static str = "SyncGoogleCalendar";
    const DOCUMENT: &'static str = r"mutation SyncGoogleCalendar($accessToken: String!) {
  syncGoogleCalendar(accessToken: $accessToken) { imported updated }
}";
    const KIND: OperationKind = OperationKind::Mutation;
    const INVALIDATES: &'static [&'static str] = &["CalendarOccurrences"];
    type Variables = SyncGoogleCalendarVariables;
    type Data = SyncGoogleCalendarData;
}
