use std::sync::Arc;

use pairing_client::operations::MyAchievements;
use pairing_client::{ClientResult, GraphqlClient, NoVariables};
use pairing_core::Achievement;

/// Earned badges first (most recent on top), then the locked ones
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AchievementBoard {
    pub earned: Vec<Achievement>,
    pub locked: Vec<Achievement>,
}

impl AchievementBoard {
    pub fn new(achievements: Vec<Achievement>) -> Self {
        let (mut earned, locked): (Vec<_>, Vec<_>) =
            achievements.into_iter().partition(Achievement::is_earned);
        earned.sort_by(|a, b| b.earned_at.cmp(&a.earned_at));
        Self { earned, locked }
    }

    /// "3 of 8 earned"
    pub fn progress(&self) -> String {
        format!(
            "{} of {} earned",
            self.earned.len(),
            self.earned.len() + self.locked.len()
        )
    }
}

pub async fn load(client: &Arc<GraphqlClient>) -> ClientResult<AchievementBoard> {
    let achievements = client
        .query::<MyAchievements>(&NoVariables {})
        .await?
        .my_achievements;
    Ok(AchievementBoard::new(achievements))
}
