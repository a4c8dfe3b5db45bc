//! Meeting queries and mutations

use chrono::{DateTime, Utc};
use pairing_core::MeetingEvent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PairingIdVariables;
use crate::graphql::{NoVariables, Operation, OperationKind};

/// Meetings scheduled for one pairing
pub struct PairingMeetings;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingMeetingsData {
    pub pairing_meetings: Vec<MeetingEvent>,
}

impl Operation for PairingMeetings {
    const NAME: &'static str = "PairingMeetings";
    const DOCUMENT: &'static str = r"query PairingMeetings($pairingId: ID!) {
  pairingMeetings(pairingId: $pairingId) {
    id pairingId user1Id user2Id user1Status user2Status createdAt
    scheduled { start end }
    user1Proposal { range { start end } proposedAt }
    user2Proposal { range { start end } proposedAt }
  }
}";
    const KIND: OperationKind = OperationKind::Query;
    type Variables = PairingIdVariables;
    type Data = PairingMeetingsData;
}

/// Suggest a (new) time for a meeting; creates the meeting when `meeting_id` is absent
pub struct ProposeMeetingTime;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeMeetingTimeVariables {
    pub pairing_id: Uuid,
    pub meeting_id: Option<Uuid>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeMeetingTimeData {
    pub propose_meeting_time: MeetingEvent,
}

impl Operation for ProposeMeetingTime {
    const NAME: &'static str = "ProposeMeetingTime";
    const DOCUMENT: &'static str = r"mutation ProposeMeetingTime($pairingId: ID!, $meetingId: ID, $start: DateTime!, $end: DateTime!) {
  proposeMeetingTime(pairingId: $pairingId, meetingId: $meetingId, start: $start, end: $end) {
    id pairingId user1Id user2Id user1Status user2Status createdAt
    scheduled { start end }
    user1Proposal { range { start end } proposedAt }
    user2Proposal { range { start end } proposedAt }
  }
}";
    const KIND: OperationKind = OperationKind::Mutation;
    const INVALIDATES: &'static [&'static str] = &["PairingMeetings", "CalendarOccurrences"];
    type Variables = ProposeMeetingTimeVariables;
    type Data = ProposeMeetingTimeData;
}

/// Accept the meeting's current time
pub struct ConfirmMeeting;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmMeetingVariables {
    pub meeting_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmMeetingData {
    pub confirm_meeting: MeetingEvent,
}

impl Operation for ConfirmMeeting {
    const NAME: &'static str = "ConfirmMeeting";
    const DOCUMENT: &'static str = r"mutation ConfirmMeeting($meetingId: ID!) {
  confirmMeeting(meetingId: $meetingId) {
    id pairingId user1Id user2Id user1Status user2Status createdAt
    scheduled { start end }
    user1Proposal { range { start end } proposedAt }
    user2Proposal { range { start end } proposedAt }
  }
}";
    const KIND: OperationKind = OperationKind::Mutation;
    const INVALIDATES: &'static [&'static str] = &["PairingMeetings", "CalendarOccurrences"];
    type Variables = ConfirmMeetingVariables;
    type Data = ConfirmMeetingData;
}

/// Past confirmed meetings the signed-in user has not rated yet
pub struct UnratedMeetings;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnratedMeetingsData {
    pub unrated_meetings: Vec<MeetingEvent>,
}

impl Operation for UnratedMeetings {
    const NAME: &'static str = "UnratedMeetings";
    const DOCUMENT: &'static str = r"query UnratedMeetings {
  unratedMeetings {
    id pairingId user1Id user2Id user1Status user2Status createdAt
    scheduled { start end }
    user1Proposal { range { start end } proposedAt }
    user2Proposal { range { start end } proposedAt }
  }
}";
    const KIND: OperationKind = OperationKind::Query;
    type Variables = NoVariables;
    type Data = UnratedMeetingsData;
}
