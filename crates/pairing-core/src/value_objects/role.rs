//! Application roles and role sets used for route and UI gating
//!
//! A user holds exactly one [`AppRole`]. Routes and sidebar entries declare the
//! [`RoleSet`] allowed to see them.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role assigned to a user by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppRole {
    User,
    OrgAdmin,
    SuperAdmin,
}

impl AppRole {
    /// Wire name of the role
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::OrgAdmin => "org_admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Human readable label for headers and badges
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "Member",
            Self::OrgAdmin => "Organization admin",
            Self::SuperAdmin => "Super admin",
        }
    }

    /// Whether the role can administer at least one organization
    #[inline]
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::OrgAdmin | Self::SuperAdmin)
    }

    /// The single-role set for this role
    #[must_use]
    pub const fn as_set(self) -> RoleSet {
        match self {
            Self::User => RoleSet::USER,
            Self::OrgAdmin => RoleSet::ORG_ADMIN,
            Self::SuperAdmin => RoleSet::SUPER_ADMIN,
        }
    }
}

impl fmt::Display for AppRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing a role from a string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

impl FromStr for AppRole {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "org_admin" => Ok(Self::OrgAdmin),
            "super_admin" => Ok(Self::SuperAdmin),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

bitflags! {
    /// Set of roles allowed to access a route or UI element
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RoleSet: u8 {
        const USER        = 1 << 0;
        const ORG_ADMIN   = 1 << 1;
        const SUPER_ADMIN = 1 << 2;

        /// Both admin roles
        const ADMINS = Self::ORG_ADMIN.bits() | Self::SUPER_ADMIN.bits();

        /// Every signed-in user
        const ANY = Self::USER.bits() | Self::ADMINS.bits();
    }
}

impl RoleSet {
    /// Check whether `role` is a member of this set
    #[inline]
    #[must_use]
    pub fn contains_role(&self, role: AppRole) -> bool {
        self.contains(role.as_set())
    }

    /// Roles in this set, lowest privilege first
    #[must_use]
    pub fn roles(&self) -> Vec<AppRole> {
        [AppRole::User, AppRole::OrgAdmin, AppRole::SuperAdmin]
            .into_iter()
            .filter(|role| self.contains_role(*role))
            .collect()
    }
}

impl FromIterator<AppRole> for RoleSet {
    fn from_iter<I: IntoIterator<Item = AppRole>>(iter: I) -> Self {
        iter.into_iter()
            .fold(RoleSet::empty(), |acc, role| acc | role.as_set())
    }
}
