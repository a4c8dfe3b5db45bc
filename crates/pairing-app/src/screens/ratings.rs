//! Ratings: received scores and the post-meeting rating prompt

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pairing_client::forms::RatingForm;
use pairing_client::operations::{MyRatings, SubmitRating, SubmitRatingVariables, UnratedMeetings};
use pairing_client::{
    check, ClientError, ClientResult, GraphqlClient, NoVariables, RatingPromptTracker,
};
use pairing_core::{MeetingEvent, Rating, SessionStorage};
use tracing::debug;

use crate::notice::Notice;

/// Scores the signed-in user received
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedRatings {
    pub ratings: Vec<Rating>,
    pub average: Option<f64>,
}

pub struct RatingsScreen {
    client: Arc<GraphqlClient>,
    tracker: RatingPromptTracker,
}

impl RatingsScreen {
    pub fn new(client: Arc<GraphqlClient>, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            client,
            tracker: RatingPromptTracker::new(storage),
        }
    }

    pub async fn received(&self) -> ClientResult<ReceivedRatings> {
        let mut ratings = self
            .client
            .query::<MyRatings>(&NoVariables {})
            .await?
            .my_ratings;
        ratings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let average = Rating::average(&ratings);
        Ok(ReceivedRatings { ratings, average })
    }

    /// The meeting to ask about now, if any. Each meeting is asked about once
    /// per session; dismissing the prompt does not bring it back.
    pub async fn next_prompt(&self, now: DateTime<Utc>) -> ClientResult<Option<MeetingEvent>> {
        let me = self.client.session().user_id().ok_or(ClientError::NotSignedIn)?;
        let unrated: Vec<MeetingEvent> = self
            .client
            .refetch::<UnratedMeetings>(&NoVariables {})
            .await?
            .unrated_meetings
            .into_iter()
            .filter(|m| m.needs_rating_by(me, now))
            .collect();

        let next = self.tracker.next_prompt(&unrated)?.cloned();
        if let Some(meeting) = &next {
            debug!(meeting_id = %meeting.id, "Rating prompt");
        }
        Ok(next)
    }

    pub async fn submit(&self, form: &RatingForm) -> Notice {
        if let Err(fields) = check(form) {
            return Notice::invalid(fields);
        }
        let input = match form.to_input() {
            Ok(input) => input,
            Err(err) => return Notice::error(err.to_string()).inline(),
        };
        match self
            .client
            .mutate::<SubmitRating>(&SubmitRatingVariables { input })
            .await
        {
            Ok(_) => Notice::success("Thanks for your feedback!"),
            Err(err) => Notice::from_error(&err),
        }
    }
}
