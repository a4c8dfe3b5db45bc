//! Pairing algorithm settings and execution
//!
//! The algorithm itself runs on the server. The client edits two integers
//! and triggers a run, showing the returned counts and warnings as they are.

use pairing_core::{AlgorithmRunResult, PairingAlgorithmSettings as Settings};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::OrganizationIdVariables;
use crate::graphql::{Operation, OperationKind};

pub struct PairingAlgorithmSettings;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingAlgorithmSettingsData {
    pub pairing_algorithm_settings: Settings,
}

impl Operation for PairingAlgorithmSettings {
    const NAME: &'static str = "PairingAlgorithmSettings";
    const DOCUMENT: &'static str = r"query PairingAlgorithmSettings($organizationId: ID!) {
  pairingAlgorithmSettings(organizationId: $organizationId) { periodLengthDays randomSeed updatedAt }
}";
    const KIND: OperationKind = OperationKind::Query;
    type Variables = OrganizationIdVariables;
    type Data = PairingAlgorithmSettingsData;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePairingAlgorithmSettingsVariables {
    pub organization_id: Uuid,
    pub period_length_days: i32,
    pub random_seed: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePairingAlgorithmSettingsData {
    pub update_pairing_algorithm_settings: Settings,
}

pub struct UpdatePairingAlgorithmSettings;

impl Operation for UpdatePairingAlgorithmSettings {
    const NAME: &'static str = "UpdatePairingAlgorithmSettings";
    const DOCUMENT: &'static str = r"mutation UpdatePairingAlgorithmSettings($organizationId: ID!, $periodLengthDays: Int!, $randomSeed: Int!) {
  updatePairingAlgorithmSettings(organizationId: $organizationId, periodLengthDays: $periodLengthDays, randomSeed: $randomSeed) {
    periodLengthDays randomSeed updatedAt
  }
}";
    const KIND: OperationKind = OperationKind::Mutation;
    const INVALIDATES: &'static [&'static str] = &["PairingAlgorithmSettings"];
    type Variables = UpdatePairingAlgorithmSettingsVariables;
    type Data = UpdatePairingAlgorithmSettingsData;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutePairingAlgorithmData {
    pub execute_pairing_algorithm: AlgorithmRunResult,
}

/// Run the server-side pairing algorithm for an organization
pub struct ExecutePairingAlgorithm;

impl Operation for ExecutePairingAlgorithm {
    const NAME: &'static str = "ExecutePairingAlgorithm";
    const DOCUMENT: &'static str = r"mutation ExecutePairingAlgorithm($organizationId: ID!) {
  executePairingAlgorithm(organizationId: $organizationId) { pairsCreated usersUnpaired warnings }
}";
    const KIND: OperationKind = OperationKind::Mutation;
    const INVALIDATES: &'static [&'static str] = &[
        "MyPairings",
        "OrganizationPairings",
        "OrganizationStatistics",
    ];
    type Variables = OrganizationIdVariables;
    type Data = ExecutePairingAlgorithmData;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_result_is_kept_verbatim() {
        let data: ExecutePairingAlgorithmData = serde_json::from_value(json!({
            "executePairingAlgorithm": {
                "pairsCreated": 12,
                "usersUnpaired": 1,
                "warnings": ["Odd number of active users", "2 users excluded: banned"]
            }
        }))
        .unwrap();

        let result = data.execute_pairing_algorithm;
        assert_eq!(result.pairs_created, 12);
        assert_eq!(result.warnings[1], "2 users excluded: banned");
    }

    #[test]
    fn test_settings_variables() {
        let vars = UpdatePairingAlgorithmSettingsVariables {
            organization_id: Uuid::nil(),
            period_length_days: 14,
            random_seed: 42,
        };
        let json = serde_json::to_value(vars).unwrap();
        assert_eq!(json["periodLengthDays"], 14);
        assert_eq!(json["randomSeed"], 42);
    }
}
