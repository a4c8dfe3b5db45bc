//! Meeting ratings

use pairing_core::Rating;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::graphql::{NoVariables, Operation, OperationKind};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingInput {
    pub meeting_id: Uuid,
    pub score: u8,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitRatingVariables {
    pub input: RatingInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingData {
    pub submit_rating: Rating,
}

/// Rate the partner after a meeting
pub struct SubmitRating;

impl Operation for SubmitRating {
    const NAME: &'static str = "SubmitRating";
    const DOCUMENT: &'static str = r"mutation SubmitRating($input: RatingInput!) {
  submitRating(input: $input) { id meetingId raterId rateeId score comment createdAt }
}";
    const KIND: OperationKind = OperationKind::Mutation;
    const INVALIDATES: &'static [&'static str] = &[
        "UnratedMeetings",
        "MyRatings",
        "MyAchievements",
        "OrganizationStatistics",
    ];
    type Variables = SubmitRatingVariables;
    type Data = SubmitRatingData;
}

/// Ratings the signed-in user received
pub struct MyRatings;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyRatingsData {
    pub my_ratings: Vec<Rating>,
}

impl Operation for MyRatings {
    const NAME: &'static str = "MyRatings";
    const DOCUMENT: &'static str = r"query MyRatings {
  myRatings { id meetingId raterId rateeId score comment createdAt }
}";
    const KIND: OperationKind = OperationKind::Query;
    type Variables = NoVariables;
    type Data = MyRatingsData;
}
