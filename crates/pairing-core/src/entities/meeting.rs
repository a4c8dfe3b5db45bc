//! Meeting event - a proposed or confirmed time slot between two paired users
//!
//! Each participant carries their own confirmation status and at most one
//! counter-proposal. The banner shown above the meeting is derived from those
//! two statuses and up to two proposals; the most recent proposal wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::value_objects::TimeRange;

/// Per-user status of a meeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    /// No answer yet
    Pending,
    /// Accepted the current time
    Confirmed,
    /// Suggested a different time
    Proposed,
}

/// A counter-proposal made by one participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingProposal {
    pub range: TimeRange,
    pub proposed_at: DateTime<Utc>,
}

/// Meeting between the two users of a pairing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingEvent {
    pub id: Uuid,
    pub pairing_id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub user1_status: MeetingStatus,
    pub user2_status: MeetingStatus,
    /// Initially suggested slot, if any
    pub scheduled: Option<TimeRange>,
    pub user1_proposal: Option<MeetingProposal>,
    pub user2_proposal: Option<MeetingProposal>,
    pub created_at: DateTime<Utc>,
}

/// Mutually exclusive UI states of the meeting proposal banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingBanner {
    /// Both users confirmed
    BothConfirmed { range: Option<TimeRange> },
    /// No counter-proposal exists yet
    PendingInitial {
        range: Option<TimeRange>,
        awaiting_viewer: bool,
    },
    /// The partner's proposal is the latest one
    CounterProposedByOther { proposal: MeetingProposal },
    /// The viewer's own proposal is the latest one
    CounterProposedBySelf { proposal: MeetingProposal },
}

impl MeetingBanner {
    /// Whether the viewer is expected to act (confirm or counter)
    pub fn requires_viewer_action(&self) -> bool {
        match self {
            Self::BothConfirmed { .. } | Self::CounterProposedBySelf { .. } => false,
            Self::PendingInitial {
                awaiting_viewer, ..
            } => *awaiting_viewer,
            Self::CounterProposedByOther { .. } => true,
        }
    }
}

/// One participant's view of the meeting
#[derive(Debug, Clone, Copy)]
struct Side {
    status: MeetingStatus,
}

impl MeetingEvent {
    /// Check whether the user takes part in the meeting
    #[inline]
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user1_id == user_id || self.user2_id == user_id
    }

    /// The viewer's partner in this meeting
    pub fn partner_of(&self, viewer: Uuid) -> DomainResult<Uuid> {
        if viewer == self.user1_id {
            Ok(self.user2_id)
        } else if viewer == self.user2_id {
            Ok(self.user1_id)
        } else {
            Err(DomainError::NotPairingMember(viewer))
        }
    }

    /// The viewer's own status
    pub fn status_of(&self, viewer: Uuid) -> DomainResult<MeetingStatus> {
        self.sides(viewer).map(|(me, _)| me.status)
    }

    fn sides(&self, viewer: Uuid) -> DomainResult<(Side, Side)> {
        let user1 = Side {
            status: self.user1_status,
        };
        let user2 = Side {
            status: self.user2_status,
        };
        if viewer == self.user1_id {
            Ok((user1, user2))
        } else if viewer == self.user2_id {
            Ok((user2, user1))
        } else {
            Err(DomainError::NotPairingMember(viewer))
        }
    }

    /// The most recent proposal and the user who made it.
    ///
    /// Equal `proposed_at` values resolve to `user2`'s proposal, so both
    /// participants agree on the slot under negotiation.
    fn latest_proposal(&self) -> Option<(MeetingProposal, Uuid)> {
        match (self.user1_proposal, self.user2_proposal) {
            (None, None) => None,
            (Some(first), None) => Some((first, self.user1_id)),
            (None, Some(second)) => Some((second, self.user2_id)),
            (Some(first), Some(second)) => {
                if first.proposed_at > second.proposed_at {
                    Some((first, self.user1_id))
                } else {
                    Some((second, self.user2_id))
                }
            }
        }
    }

    /// The time both users are currently negotiating about
    pub fn current_range(&self) -> Option<TimeRange> {
        self.latest_proposal()
            .map(|(p, _)| p.range)
            .or(self.scheduled)
    }

    /// Derive the banner shown to `viewer`
    pub fn banner_for(&self, viewer: Uuid) -> DomainResult<MeetingBanner> {
        let (me, partner) = self.sides(viewer)?;

        if me.status == MeetingStatus::Confirmed && partner.status == MeetingStatus::Confirmed {
            return Ok(MeetingBanner::BothConfirmed {
                range: self.current_range(),
            });
        }

        Ok(match self.latest_proposal() {
            None => MeetingBanner::PendingInitial {
                range: self.scheduled,
                awaiting_viewer: me.status != MeetingStatus::Confirmed,
            },
            Some((proposal, by)) if by == viewer => {
                MeetingBanner::CounterProposedBySelf { proposal }
            }
            Some((proposal, _)) => MeetingBanner::CounterProposedByOther { proposal },
        })
    }

    /// Both users confirmed
    pub fn is_confirmed(&self) -> bool {
        self.user1_status == MeetingStatus::Confirmed
            && self.user2_status == MeetingStatus::Confirmed
    }

    /// Confirmed and already over
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.is_confirmed() && self.current_range().is_some_and(|r| r.end <= now)
    }

    /// Whether `viewer` should be asked to rate this meeting
    pub fn needs_rating_by(&self, viewer: Uuid, now: DateTime<Utc>) -> bool {
        self.involves(viewer) && self.is_past(now)
    }
}
