//! Route table
//!
//! Every screen of the app, its path and the roles allowed to see it.
//! `ProtectedRoute` turns the current session into a render/redirect decision.

use pairing_client::SessionSnapshot;
use pairing_core::{AppRole, RoleSet};
use uuid::Uuid;

/// A screen of the app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    // Public
    Login,
    Register,
    ResetPassword,
    UpdatePassword,
    AuthCallback,
    CalendarCallback,
    AccessDenied,
    Banned,

    // Every signed-in user
    Dashboard,
    Profile,
    Pairings,
    Chat(Uuid),
    Calendar,
    Ratings,
    Achievements,
    Reports,

    // Organization admins and super admins
    Users,
    Organizations,
    Statistics,
    AlgorithmSettings,

    // Super admins
    AllOrganizations,
}

impl Route {
    /// Parse a path; query string and fragment are ignored
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        let route = match path {
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/reset-password" => Self::ResetPassword,
            "/update-password" => Self::UpdatePassword,
            "/auth/callback" => Self::AuthCallback,
            "/calendar/callback" => Self::CalendarCallback,
            "/access-denied" => Self::AccessDenied,
            "/banned" => Self::Banned,
            "/" => Self::Dashboard,
            "/profile" => Self::Profile,
            "/pairings" => Self::Pairings,
            "/calendar" => Self::Calendar,
            "/ratings" => Self::Ratings,
            "/achievements" => Self::Achievements,
            "/reports" => Self::Reports,
            "/admin/users" => Self::Users,
            "/admin/organizations" => Self::Organizations,
            "/admin/statistics" => Self::Statistics,
            "/admin/algorithm" => Self::AlgorithmSettings,
            "/super-admin/organizations" => Self::AllOrganizations,
            other => {
                let id = other.strip_prefix("/chat/")?;
                Self::Chat(Uuid::parse_str(id).ok()?)
            }
        };
        Some(route)
    }

    pub fn path(&self) -> String {
        let path = match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::ResetPassword => "/reset-password",
            Self::UpdatePassword => "/update-password",
            Self::AuthCallback => "/auth/callback",
            Self::CalendarCallback => "/calendar/callback",
            Self::AccessDenied => "/access-denied",
            Self::Banned => "/banned",
            Self::Dashboard => "/",
            Self::Profile => "/profile",
            Self::Pairings => "/pairings",
            Self::Chat(pairing_id) => return format!("/chat/{pairing_id}"),
            Self::Calendar => "/calendar",
            Self::Ratings => "/ratings",
            Self::Achievements => "/achievements",
            Self::Reports => "/reports",
            Self::Users => "/admin/users",
            Self::Organizations => "/admin/organizations",
            Self::Statistics => "/admin/statistics",
            Self::AlgorithmSettings => "/admin/algorithm",
            Self::AllOrganizations => "/super-admin/organizations",
        };
        path.to_string()
    }

    /// Roles allowed to see the route; `None` for public routes
    pub fn allowed_roles(&self) -> Option<RoleSet> {
        match self {
            Self::Login
            | Self::Register
            | Self::ResetPassword
            | Self::UpdatePassword
            | Self::AuthCallback
            | Self::CalendarCallback
            | Self::AccessDenied
            | Self::Banned => None,
            Self::Dashboard
            | Self::Profile
            | Self::Pairings
            | Self::Chat(_)
            | Self::Calendar
            | Self::Ratings
            | Self::Achievements
            | Self::Reports => Some(RoleSet::ANY),
            Self::Users | Self::Organizations | Self::Statistics | Self::AlgorithmSettings => {
                Some(RoleSet::ADMINS)
            }
            Self::AllOrganizations => Some(RoleSet::SUPER_ADMIN),
        }
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.allowed_roles().is_none()
    }

    /// Sign-in pages that a signed-in user is sent away from
    pub fn is_sign_in_page(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Register => "Create account",
            Self::ResetPassword => "Reset password",
            Self::UpdatePassword => "Choose a new password",
            Self::AuthCallback | Self::CalendarCallback => "Signing in",
            Self::AccessDenied => "Access denied",
            Self::Banned => "Account suspended",
            Self::Dashboard => "Dashboard",
            Self::Profile => "Profile",
            Self::Pairings => "Pairings",
            Self::Chat(_) => "Chat",
            Self::Calendar => "Calendar",
            Self::Ratings => "Ratings",
            Self::Achievements => "Achievements",
            Self::Reports => "Reports",
            Self::Users => "Users",
            Self::Organizations => "Organization",
            Self::Statistics => "Statistics",
            Self::AlgorithmSettings => "Pairing algorithm",
            Self::AllOrganizations => "All organizations",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Landing page after sign-in
pub fn home_for(role: AppRole) -> Route {
    match role {
        AppRole::User => Route::Dashboard,
        AppRole::OrgAdmin => Route::Statistics,
        AppRole::SuperAdmin => Route::AllOrganizations,
    }
}

/// Outcome of guarding a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session or profile still loading; show a spinner
    Loading,
    /// Send the user elsewhere
    Redirect(Route),
    Render,
}

/// Role gate in front of a protected screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectedRoute {
    allowed: RoleSet,
}

impl ProtectedRoute {
    pub fn new(allowed: RoleSet) -> Self {
        Self { allowed }
    }

    /// Gate for `route`; `None` for public routes
    pub fn for_route(route: &Route) -> Option<Self> {
        route.allowed_roles().map(Self::new)
    }

    pub fn allowed(&self) -> RoleSet {
        self.allowed
    }

    pub fn decide(&self, session: &SessionSnapshot) -> RouteDecision {
        if session.loading {
            return RouteDecision::Loading;
        }
        if !session.is_authenticated() {
            return RouteDecision::Redirect(Route::Login);
        }
        match session.role {
            Some(role) if self.allowed.contains_role(role) => RouteDecision::Render,
            _ => RouteDecision::Redirect(Route::AccessDenied),
        }
    }
}

/// Decide any route: public ones render, except the sign-in pages for a
/// signed-in user, who lands on their home page instead
pub fn resolve(route: &Route, session: &SessionSnapshot) -> RouteDecision {
    match ProtectedRoute::for_route(route) {
        Some(gate) => gate.decide(session),
        None if route.is_sign_in_page() && !session.loading => match session.role {
            Some(role) if session.is_authenticated() => RouteDecision::Redirect(home_for(role)),
            _ => RouteDecision::Render,
        },
        None => RouteDecision::Render,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in(role: AppRole) -> SessionSnapshot {
        SessionSnapshot {
            loading: false,
            user_id: Some(Uuid::new_v4()),
            role: Some(role),
            organization_id: None,
            display_name: Some("Ada Lovelace".into()),
        }
    }

    #[test]
    fn test_parse_and_path_agree() {
        let chat = Route::Chat(Uuid::new_v4());
        for route in [
            Route::Login,
            Route::Dashboard,
            Route::AlgorithmSettings,
            Route::AllOrganizations,
            Route::CalendarCallback,
            chat,
        ] {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
    }

    #[test]
    fn test_parse_ignores_query_and_trailing_slash() {
        assert_eq!(Route::parse("/profile/"), Some(Route::Profile));
        assert_eq!(
            Route::parse("/auth/callback?type=recovery#access_token=x"),
            Some(Route::AuthCallback)
        );
        assert_eq!(Route::parse(""), Some(Route::Dashboard));
        assert_eq!(Route::parse("/chat/not-a-uuid"), None);
        assert_eq!(Route::parse("/nowhere"), None);
    }

    #[test]
    fn test_loading_session_waits() {
        let loading = SessionSnapshot {
            loading: true,
            ..SessionSnapshot::default()
        };
        let gate = ProtectedRoute::new(RoleSet::ANY);
        assert_eq!(gate.decide(&loading), RouteDecision::Loading);
    }

    #[test]
    fn test_signed_out_goes_to_login() {
        let gate = ProtectedRoute::new(RoleSet::ANY);
        assert_eq!(
            gate.decide(&SessionSnapshot::default()),
            RouteDecision::Redirect(Route::Login)
        );
    }

    #[test]
    fn test_role_outside_allowed_set_is_denied() {
        let admin_only = ProtectedRoute::for_route(&Route::Users).unwrap();
        assert_eq!(
            admin_only.decide(&signed_in(AppRole::User)),
            RouteDecision::Redirect(Route::AccessDenied)
        );
        assert_eq!(admin_only.decide(&signed_in(AppRole::OrgAdmin)), RouteDecision::Render);

        let super_only = ProtectedRoute::for_route(&Route::AllOrganizations).unwrap();
        assert_eq!(
            super_only.decide(&signed_in(AppRole::OrgAdmin)),
            RouteDecision::Redirect(Route::AccessDenied)
        );
        assert_eq!(super_only.decide(&signed_in(AppRole::SuperAdmin)), RouteDecision::Render);
    }

    #[test]
    fn test_missing_role_is_denied() {
        let mut session = signed_in(AppRole::User);
        session.role = None;
        assert_eq!(
            ProtectedRoute::new(RoleSet::ANY).decide(&session),
            RouteDecision::Redirect(Route::AccessDenied)
        );
    }

    #[test]
    fn test_public_routes_render() {
        assert!(ProtectedRoute::for_route(&Route::Banned).is_none());
        assert_eq!(
            resolve(&Route::ResetPassword, &SessionSnapshot::default()),
            RouteDecision::Render
        );
        assert_eq!(
            resolve(&Route::Login, &signed_in(AppRole::OrgAdmin)),
            RouteDecision::Redirect(Route::Statistics)
        );
    }

    #[test]
    fn test_home_for_role() {
        assert_eq!(home_for(AppRole::User), Route::Dashboard);
        assert_eq!(home_for(AppRole::SuperAdmin), Route::AllOrganizations);
        for role in [AppRole::User, AppRole::OrgAdmin, AppRole::SuperAdmin] {
            let home = home_for(role);
            assert_eq!(resolve(&home, &signed_in(role)), RouteDecision::Render);
        }
    }
}
