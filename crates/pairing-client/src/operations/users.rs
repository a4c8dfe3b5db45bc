//! User queries and mutations

use pairing_core::{AppRole, User};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::IdVariables;
use crate::graphql::{NoVariables, Operation, OperationKind};

/// The signed-in user's profile, including the app role
pub struct CurrentUser;

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUserData {
    pub me: User,
}

impl Operation for CurrentUser {
    const NAME: &'static str = "CurrentUser";
    const DOCUMENT: &'static str = r"query CurrentUser {
  me { id email firstName lastName role organizationId isBanned avatarUrl bio createdAt }
}";
    const KIND: OperationKind = OperationKind::Query;
    type Variables = NoVariables;
    type Data = CurrentUserData;
}

/// Users of an organization (or all, for super admins), optionally filtered by a search term
pub struct ListUsers;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersVariables {
    pub organization_id: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListUsersData {
    pub users: Vec<User>,
}

impl Operation for ListUsers {
    const NAME: &'static str = "ListUsers";
    const DOCUMENT: &'static str = r"query ListUsers($organizationId: ID, $search: String) {
  users(organizationId: $organizationId, search: $search) {
    id email firstName lastName role organizationId isBanned avatarUrl bio createdAt
  }
}";
    const KIND: OperationKind = OperationKind::Query;
    type Variables = ListUsersVariables;
    type Data = ListUsersData;
}

pub struct GetUser;

#[derive(Debug, Clone, Deserialize)]
pub struct GetUserData {
    pub user: Option<User>,
}

impl Operation for GetUser {
    const NAME: &'static str = "GetUser";
    const DOCUMENT: &'static str = r"query GetUser($id: ID!) {
  user(id: $id) { id email firstName lastName role organizationId isBanned avatarUrl bio createdAt }
}";
    const KIND: OperationKind = OperationKind::Query;
    type Variables = IdVariables;
    type Data = GetUserData;
}

/// Edit the signed-in user's own profile
pub struct UpdateProfile;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateProfileVariables {
    pub input: ProfileInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileData {
    pub update_profile: User,
}

impl Operation for UpdateProfile {
    const NAME: &'static str = "UpdateProfile";
    const DOCUMENT: &'static str = r"mutation UpdateProfile($input: UpdateProfileInput!) {
  updateProfile(input: $input) {
    id email firstName lastName role organizationId isBanned avatarUrl bio createdAt
  }
}";
    const KIND: OperationKind = OperationKind::Mutation;
    const INVALIDATES: &'static [&'static str] = &["CurrentUser", "ListUsers", "GetUser"];
    type Variables = UpdateProfileVariables;
    type Data = UpdateProfileData;
}

/// Ban or unban a user (admins)
pub struct SetUserBanned;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetUserBannedVariables {
    pub user_id: Uuid,
    pub banned: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetUserBannedData {
    pub set_user_banned: User,
}

impl Operation for SetUserBanned {
    const NAME: &'static str = "SetUserBanned";
    const DOCUMENT: &'static str = r"mutation SetUserBanned($userId: ID!, $banned: Boolean!) {
  setUserBanned(userId: $userId, banned: $banned) {
    id email firstName lastName role organizationId isBanned avatarUrl bio createdAt
  }
}";
    const KIND: OperationKind = OperationKind::Mutation;
    const INVALIDATES: &'static [&'static str] = &["ListUsers", "GetUser", "OrganizationStatistics"];
    type Variables = SetUserBannedVariables;
    type Data = SetUserBannedData;
}

/// Change a user's role (super admins)
pub struct UpdateUserRole;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRoleVariables {
    pub user_id: Uuid,
    pub role: AppRole,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRoleData {
    pub update_user_role: User,
}

impl Operation for UpdateUserRole {
    const NAME: &'static str = "UpdateUserRole";
    const DOCUMENT: &'static str = r"mutation UpdateUserRole($userId: ID!, $role: AppRole!) {
  updateUserRole(userId: $userId, role: $role) {
    id email firstName lastName role organizationId isBanned avatarUrl bio createdAt
  }
}";
    const KIND: OperationKind = OperationKind::Mutation;
    const INVALIDATES: &'static [&'static str] = &["ListUsers", "GetUser"];
    type Variables = UpdateUserRoleVariables;
    type Data = UpdateUserRoleData;
}
