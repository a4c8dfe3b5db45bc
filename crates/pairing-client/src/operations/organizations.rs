//! Organization queries and mutations

use pairing_core::Organization;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{IdVariables, OrganizationIdVariables};
use crate::graphql::{NoVariables, Operation, OperationKind};

pub struct ListOrganizations;

#[derive(Debug, Clone, Deserialize)]
pub struct ListOrganizationsData {
    pub organizations: Vec<Organization>,
}

impl Operation for ListOrganizations {
    const NAME: &'static str = "ListOrganizations";
    const DOCUMENT: &'static str = r"query ListOrganizations {
  organizations { id name description inviteCode memberCount createdAt }
}";
    const KIND: OperationKind = OperationKind::Query;
    type Variables = NoVariables;
    type Data = ListOrganizationsData;
}

pub struct GetOrganization;

#[derive(Debug, Clone, Deserialize)]
pub struct GetOrganizationData {
    pub organization: Option<Organization>,
}

impl Operation for GetOrganization {
    const NAME: &'static str = "GetOrganization";
    const DOCUMENT: &'static str = r"query GetOrganization($id: ID!) {
  organization(id: $id) { id name description inviteCode memberCount createdAt }
}";
    const KIND: OperationKind = OperationKind::Query;
    type Variables = IdVariables;
    type Data = GetOrganizationData;
}

#[derive(Debug, Clone, Serialize)]
pub struct OrganizationInput {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrganizationVariables {
    pub input: OrganizationInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationData {
    pub create_organization: Organization,
}

/// Create an organization (super admins)
pub struct CreateOrganization;

impl Operation for CreateOrganization {
    const NAME: &'static str = "CreateOrganization";
    const DOCUMENT: &'static str = r"mutation CreateOrganization($input: OrganizationInput!) {
  createOrganization(input: $input) { id name description inviteCode memberCount createdAt }
}";
    const KIND: OperationKind = OperationKind::Mutation;
    const INVALIDATES: &'static [&'static str] = &["ListOrganizations"];
    type Variables = CreateOrganizationVariables;
    type Data = CreateOrganizationData;
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateOrganizationVariables {
    pub id: Uuid,
    pub input: OrganizationInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationData {
    pub update_organization: Organization,
}

pub struct UpdateOrganization;

impl Operation for UpdateOrganization {
    const NAME: &'static str = "UpdateOrganization";
    const DOCUMENT: &'static str = r"mutation UpdateOrganization($id: ID!, $input: OrganizationInput!) {
  updateOrganization(id: $id, input: $input) { id name description inviteCode memberCount createdAt }
}";
    const KIND: OperationKind = OperationKind::Mutation;
    const INVALIDATES: &'static [&'static str] = &["ListOrganizations", "GetOrganization"];
    type Variables = UpdateOrganizationVariables;
    type Data = UpdateOrganizationData;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateInviteCodeData {
    pub regenerate_invite_code: Organization,
}

/// Replace the organization's invite code; the old one stops working
pub struct RegenerateInviteCode;

impl Operation for RegenerateInviteCode {
    const NAME: &'static str = "RegenerateInviteCode";
    const DOCUMENT: &'static str = r"mutation RegenerateInviteCode($organizationId: ID!) {
  regenerateInviteCode(organizationId: $organizationId) {
    id name description inviteCode memberCount createdAt
  }
}";
    const KIND: OperationKind = OperationKind::Mutation;
    const INVALIDATES: &'static [&'static str] = &["ListOrganizations", "GetOrganization"];
    type Variables = OrganizationIdVariables;
    type Data = RegenerateInviteCodeData;
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidateInviteCodeVariables {
    pub code: String,
}

/// Result of checking an invite code on the registration form
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteCodeCheck {
    pub valid: bool,
    pub organization_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateInviteCodeData {
    pub validate_invite_code: InviteCodeCheck,
}

/// Public query used while the visitor types an invite code
pub struct ValidateInviteCode;

impl Operation for ValidateInviteCode {
    const NAME: &'static str = "ValidateInviteCode";
    const DOCUMENT: &'static str = r"query ValidateInviteCode($code: String!) {
  validateInviteCode(code: $code) { valid organizationName }
}";
    const KIND: OperationKind = OperationKind::Query;
    type Variables = ValidateInviteCodeVariables;
    type Data = ValidateInviteCodeData;
}
