//! Sidebar and header

use pairing_core::{AppRole, Organization, User};

use crate::routes::Route;

/// One sidebar entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub route: Route,
    pub label: &'static str,
}

const NAVIGATION: &[NavItem] = &[
    NavItem { route: Route::Dashboard, label: "Dashboard" },
    NavItem { route: Route::Pairings, label: "My pairings" },
    NavItem { route: Route::Calendar, label: "Calendar" },
    NavItem { route: Route::Ratings, label: "Ratings" },
    NavItem { route: Route::Achievements, label: "Achievements" },
    NavItem { route: Route::Profile, label: "Profile" },
    NavItem { route: Route::Reports, label: "Reports" },
    NavItem { route: Route::Users, label: "Users" },
    NavItem { route: Route::Organizations, label: "Organization" },
    NavItem { route: Route::Statistics, label: "Statistics" },
    NavItem { route: Route::AlgorithmSettings, label: "Pairing algorithm" },
    NavItem { route: Route::AllOrganizations, label: "All organizations" },
];

/// Navigation visible to one role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sidebar {
    items: Vec<NavItem>,
    active: Option<usize>,
}

impl Sidebar {
    /// Items whose route the role may open, with `current` highlighted
    pub fn for_role(role: AppRole, current: &Route) -> Self {
        let items: Vec<NavItem> = NAVIGATION
            .iter()
            .filter(|item| {
                item.route
                    .allowed_roles()
                    .is_some_and(|allowed| allowed.contains_role(role))
            })
            .copied()
            .collect();

        // A chat belongs under its pairing list
        let highlighted = match current {
            Route::Chat(_) => Route::Pairings,
            other => *other,
        };
        let active = items.iter().position(|item| item.route == highlighted);

        Self { items, active }
    }

    pub fn items(&self) -> &[NavItem] {
        &self.items
    }

    pub fn active(&self) -> Option<&NavItem> {
        self.active.map(|index| &self.items[index])
    }

    pub fn contains(&self, route: &Route) -> bool {
        self.items.iter().any(|item| item.route == *route)
    }
}

/// Top bar: who is signed in and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub display_name: String,
    pub initials: String,
    pub avatar_url: Option<String>,
    pub role_badge: &'static str,
    pub organization: Option<String>,
}

impl Header {
    pub fn new(user: &User, organization: Option<&Organization>) -> Self {
        Self {
            display_name: user.display_name(),
            initials: user.initials(),
            avatar_url: user.avatar_url.clone(),
            role_badge: user.role.label(),
            organization: organization.map(|org| org.name.clone()),
        }
    }
}
