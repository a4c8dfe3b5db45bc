//! Pairing queries

use pairing_core::Pairing;
use serde::Deserialize;

use super::OrganizationIdVariables;
use crate::graphql::{NoVariables, Operation, OperationKind};

/// Pairings of the signed-in user, current and past
pub struct MyPairings;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyPairingsData {
    pub my_pairings: Vec<Pairing>,
}

impl Operation for MyPairings {
    const NAME: &'static str = "MyPairings";
    const DOCUMENT: &'static str = r"query MyPairings {
  myPairings {
    id organizationId periodStart periodEnd status
    userA { id email firstName lastName role organizationId isBanned avatarUrl bio createdAt }
    userB { id email firstName lastName role organizationId isBanned avatarUrl bio createdAt }
  }
}";
    const KIND: OperationKind = OperationKind::Query;
    type Variables = NoVariables;
    type Data = MyPairingsData;
}

/// All pairings of an organization (admins)
pub struct OrganizationPairings;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationPairingsData {
    pub organization_pairings: Vec<Pairing>,
}

impl Operation for OrganizationPairings {
    const NAME: &'static str = "OrganizationPairings";
    const DOCUMENT: &'static str = r"query OrganizationPairings($organizationId: ID!) {
  organizationPairings(organizationId: $organizationId) {
    id organizationId periodStart periodEnd status
    userA { id email firstName lastName role organizationId isBanned avatarUrl bio createdAt }
    userB { id email firstName lastName role organizationId isBanned avatarUrl bio createdAt }
  }
}";
    const KIND: OperationKind = OperationKind::Query;
    type Variables = OrganizationIdVariables;
    type Data = OrganizationPairingsData;
}
