//! Organization statistics

use pairing_core::OrganizationStatistics as Statistics;
use serde::Deserialize;

use super::OrganizationIdVariables;
use crate::graphql::{Operation, OperationKind};

pub struct OrganizationStatistics;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationStatisticsData {
    pub organization_statistics: Statistics,
}

impl Operation for OrganizationStatistics {
    const NAME: &'static str = "OrganizationStatistics";
    const DOCUMENT: &'static str = r"query OrganizationStatistics($organizationId: ID!) {
  organizationStatistics(organizationId: $organizationId) {
    organizationId totalUsers activePairings completedMeetings pendingMeetings openReports averageRating
  }
}";
    const KIND: OperationKind = OperationKind::Query;
    type Variables = OrganizationIdVariables;
    type Data = OrganizationStatisticsData;
}
