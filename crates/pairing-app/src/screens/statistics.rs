//! Organization statistics dashboard

use std::sync::Arc;

use pairing_client::operations::{self, OrganizationIdVariables};
use pairing_client::{ClientResult, GraphqlClient};
use pairing_core::OrganizationStatistics;
use uuid::Uuid;

/// One figure on the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub label: &'static str,
    pub value: String,
}

pub struct StatisticsScreen {
    client: Arc<GraphqlClient>,
    organization_id: Uuid,
}

impl StatisticsScreen {
    pub fn new(client: Arc<GraphqlClient>, organization_id: Uuid) -> Self {
        Self {
            client,
            organization_id,
        }
    }

    pub async fn load(&self) -> ClientResult<OrganizationStatistics> {
        let variables = OrganizationIdVariables {
            organization_id: self.organization_id,
        };
        Ok(self
            .client
            .refetch::<operations::OrganizationStatistics>(&variables)
            .await?
            .organization_statistics)
    }
}

pub fn cards(stats: &OrganizationStatistics) -> Vec<StatCard> {
    let card = |label, value: String| StatCard { label, value };
    vec![
        card("Members", stats.total_users.to_string()),
        card("Active pairings", stats.active_pairings.to_string()),
        card("Completed meetings", stats.completed_meetings.to_string()),
        card("Pending meetings", stats.pending_meetings.to_string()),
        card(
            "Completion rate",
            stats
                .completion_rate()
                .map_or_else(|| "n/a".to_string(), |rate| format!("{rate:.0}%")),
        ),
        card(
            "Average rating",
            stats
                .average_rating
                .map_or_else(|| "n/a".to_string(), |avg| format!("{avg:.1} / 5")),
        ),
        card("Open reports", stats.open_reports.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(completed: i64, pending: i64, rating: Option<f64>) -> OrganizationStatistics {
        OrganizationStatistics {
            organization_id: Uuid::nil(),
            total_users: 10,
            active_pairings: 5,
            completed_meetings: completed,
            pending_meetings: pending,
            open_reports: 2,
            average_rating: rating,
        }
    }

    fn value<'a>(cards: &'a [StatCard], label: &str) -> &'a str {
        &cards.iter().find(|c| c.label == label).unwrap().value
    }

    #[test]
    fn test_cards_format_figures() {
        let cards = cards(&stats(3, 1, Some(4.34)));
        assert_eq!(value(&cards, "Members"), "10");
        assert_eq!(value(&cards, "Completion rate"), "75%");
        assert_eq!(value(&cards, "Average rating"), "4.3 / 5");
    }

    #[test]
    fn test_empty_organization_shows_placeholders() {
        let cards = cards(&stats(0, 0, None));
        assert_eq!(value(&cards, "Completion rate"), "n/a");
        assert_eq!(value(&cards, "Average rating"), "n/a");
    }
}
