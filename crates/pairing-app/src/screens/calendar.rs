//! Calendar screen: occurrences grouped by day, meeting negotiation for a
//! pairing, and the Google Calendar import round-trip.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use pairing_client::forms::{CalendarEventForm, MeetingProposalForm};
use pairing_client::operations::{
    CalendarOccurrences, CalendarOccurrencesVariables, CalendarSyncResult, ConfirmMeeting,
    ConfirmMeetingVariables, CreateCalendarEvent, CreateCalendarEventVariables,
    DeleteCalendarEvent, IdVariables, PairingIdVariables, PairingMeetings, ProposeMeetingTime,
    SyncGoogleCalendar, SyncGoogleCalendarVariables,
};
use pairing_client::{
    check, AuthCallback, CalendarOAuthHandoff, ClientError, ClientResult, GraphqlClient,
};
use pairing_core::{group_by_day, CalendarOccurrence, MeetingBanner, SessionStorage, TimeRange};
use tracing::{info, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::notice::Notice;

/// A meeting as the viewer sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingCard {
    pub meeting_id: Uuid,
    pub banner: MeetingBanner,
    pub range: Option<TimeRange>,
    pub needs_action: bool,
}

/// Result of returning from the Google consent screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleSync {
    /// Path to go back to
    pub redirect: String,
    pub synced: Option<CalendarSyncResult>,
}

pub struct CalendarScreen {
    client: Arc<GraphqlClient>,
    handoff: CalendarOAuthHandoff,
    callback_url: Url,
    days: BTreeMap<NaiveDate, Vec<CalendarOccurrence>>,
}

impl CalendarScreen {
    pub fn new(client: Arc<GraphqlClient>, storage: Arc<dyn SessionStorage>, callback_url: Url) -> Self {
        Self {
            client,
            handoff: CalendarOAuthHandoff::new(storage),
            callback_url,
            days: BTreeMap::new(),
        }
    }

    /// Load the occurrences inside `[start, end)`, grouped by day
    pub async fn load_window(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ClientResult<&BTreeMap<NaiveDate, Vec<CalendarOccurrence>>> {
        let variables = CalendarOccurrencesVariables { start, end };
        let occurrences = self
            .client
            .query::<CalendarOccurrences>(&variables)
            .await?
            .calendar_occurrences;
        self.days = group_by_day(occurrences);
        Ok(&self.days)
    }

    pub fn days(&self) -> &BTreeMap<NaiveDate, Vec<CalendarOccurrence>> {
        &self.days
    }

    pub async fn create_event(&self, form: &CalendarEventForm) -> Notice {
        if let Err(fields) = check(form) {
            return Notice::invalid(fields);
        }
        let variables = CreateCalendarEventVariables {
            input: form.to_input(),
        };
        match self.client.mutate::<CreateCalendarEvent>(&variables).await {
            Ok(data) => Notice::success(format!("Added {}", data.create_calendar_event.title)),
            Err(err) => Notice::from_error(&err),
        }
    }

    pub async fn delete_event(&self, id: Uuid) -> Notice {
        match self
            .client
            .mutate::<DeleteCalendarEvent>(&IdVariables { id })
            .await
        {
            Ok(data) if data.delete_calendar_event => Notice::success("Event deleted"),
            Ok(_) => Notice::error("Event could not be deleted"),
            Err(err) => Notice::from_error(&err),
        }
    }

    /// Meetings of a pairing with the banner the viewer should see
    pub async fn meetings(&self, pairing_id: Uuid) -> ClientResult<Vec<MeetingCard>> {
        let me = self.client.session().user_id().ok_or(ClientError::NotSignedIn)?;
        let meetings = self
            .client
            .query::<PairingMeetings>(&PairingIdVariables { pairing_id })
            .await?
            .pairing_meetings;

        meetings
            .iter()
            .map(|meeting| {
                let banner = meeting.banner_for(me)?;
                Ok(MeetingCard {
                    meeting_id: meeting.id,
                    range: meeting.current_range(),
                    needs_action: banner.requires_viewer_action(),
                    banner,
                })
            })
            .collect()
    }

    /// Suggest a time; creates the meeting when the form has no meeting id
    pub async fn propose(&self, form: &MeetingProposalForm) -> Notice {
        if let Err(fields) = check(form) {
            return Notice::invalid(fields);
        }
        match self
            .client
            .mutate::<ProposeMeetingTime>(&form.to_variables())
            .await
        {
            Ok(_) => Notice::success("Time proposed"),
            Err(err) => Notice::from_error(&err),
        }
    }

    pub async fn confirm(&self, meeting_id: Uuid) -> Notice {
        let variables = ConfirmMeetingVariables { meeting_id };
        match self.client.mutate::<ConfirmMeeting>(&variables).await {
            Ok(data) if data.confirm_meeting.is_confirmed() => Notice::success("Meeting confirmed"),
            Ok(_) => Notice::info("Confirmed. Waiting for your partner."),
            Err(err) => Notice::from_error(&err),
        }
    }

    /// Park the session and return the Google consent URL to open
    pub fn connect_google(&self, return_to: &str) -> ClientResult<Url> {
        let session = self.client.session();
        self.handoff.begin(
            session.provider().as_ref(),
            session.session().as_ref(),
            return_to,
            self.callback_url.clone(),
        )
    }

    /// Finish the consent round-trip: put the app session back, then import
    #[instrument(skip_all)]
    pub async fn complete_google(&self, callback_url: &Url) -> ClientResult<GoogleSync> {
        let outcome = match AuthCallback::parse(callback_url)
            .and_then(|callback| self.handoff.complete(&callback))
        {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "Calendar authorization failed");
                if let Some(session) = self.handoff.abandon() {
                    self.client.session().restore(session);
                }
                return Err(err);
            }
        };
        if let Some(session) = outcome.restore_session {
            self.client.session().restore(session);
        }
        let synced = self.sync_google().await?;
        Ok(GoogleSync {
            redirect: outcome.redirect,
            synced,
        })
    }

    /// Import with the stored calendar token, if there is one
    pub async fn sync_google(&self) -> ClientResult<Option<CalendarSyncResult>> {
        let Some(access_token) = self.handoff.access_token() else {
            return Ok(None);
        };
        let result = self
            .client
            .mutate::<SyncGoogleCalendar>(&SyncGoogleCalendarVariables { access_token })
            .await?
            .sync_google_calendar;
        self.handoff.take_access_token();
        info!(imported = result.imported, updated = result.updated, "Google Calendar synced");
        Ok(Some(result))
    }
}
