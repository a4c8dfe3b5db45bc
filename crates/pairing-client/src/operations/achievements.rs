//! Achievements

use pairing_core::Achievement;
use serde::Deserialize;

use crate::graphql::{NoVariables, Operation, OperationKind};

/// Every achievement, earned ones carrying `earnedAt`
pub struct MyAchievements;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyAchievementsData {
    pub my_achievements: Vec<Achievement>,
}

impl Operation for MyAchievements {
    const NAME: &'static str = "MyAchievements";
    const DOCUMENT: &'static str = r"query MyAchievements {
  myAchievements { code title description earnedAt }
}";
    const KIND: OperationKind = OperationKind::Query;
    type Variables = NoVariables;
    type Data = MyAchievementsData;
}
