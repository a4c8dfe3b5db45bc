//! App shell
//!
//! Owns the shared session, GraphQL client and session storage, tracks the
//! current route and reacts to session events (sign-out, ban) by moving the
//! user to the right screen.

use std::sync::Arc;

use parking_lot::RwLock;
use pairing_client::forms::LoginForm;
use pairing_client::operations::{CurrentUser, GetOrganization, IdVariables};
use pairing_client::storage::keys;
use pairing_client::{
    AuthCallback, CallbackKind, ClientError, ClientResult, GraphqlClient, HttpIdentityProvider,
    MemorySessionStorage, NoVariables, SessionContext, SessionEvent,
};
use pairing_common::AppConfig;
use pairing_core::{read_json, write_json, SessionStorage, User};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::layout::{Header, Sidebar};
use crate::notice::Notice;
use crate::routes::{home_for, resolve, Route, RouteDecision};
use crate::screens::auth::sign_in_notice;
use crate::screens::{AuthScreen, CalendarScreen, GoogleSync, RatingsScreen};

const BANNED_PROFILE_MESSAGE: &str = "Your account has been banned";

/// Shared state of a running app
pub struct AppShell {
    config: Arc<AppConfig>,
    session: Arc<SessionContext>,
    client: Arc<GraphqlClient>,
    storage: Arc<dyn SessionStorage>,
    route: RwLock<Route>,
    ban_message: RwLock<Option<String>>,
}

impl AppShell {
    /// Wire the HTTP identity provider and GraphQL client from configuration
    pub fn new(config: AppConfig) -> ClientResult<Self> {
        let provider = HttpIdentityProvider::from_config(&config.identity, config.graphql.timeout())?;
        let session = Arc::new(SessionContext::new(Arc::new(provider)));
        let client = Arc::new(GraphqlClient::http(&config.graphql, session.clone())?);
        Ok(Self::with_parts(
            config,
            client,
            Arc::new(MemorySessionStorage::new()),
        ))
    }

    pub fn with_parts(
        config: AppConfig,
        client: Arc<GraphqlClient>,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            session: client.session().clone(),
            client,
            storage,
            route: RwLock::new(Route::Login),
            ban_message: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<GraphqlClient> {
        &self.client
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.storage
    }

    pub fn current_route(&self) -> Route {
        *self.route.read()
    }

    /// Message shown on the banned screen
    pub fn ban_message(&self) -> Option<String> {
        self.ban_message.read().clone()
    }

    /// Restore a stored session and its profile, then settle on a route
    #[instrument(skip(self))]
    pub async fn bootstrap(&self, path: &str) -> RouteDecision {
        match read_json(self.storage.as_ref(), keys::AUTH_SESSION) {
            Ok(Some(stored)) => {
                self.session.restore(stored);
                match self.load_profile().await {
                    Ok(_) => {}
                    Err(ClientError::Banned(message)) => {
                        self.on_session_event(&SessionEvent::Banned(message));
                        return RouteDecision::Redirect(Route::Banned);
                    }
                    Err(err) => {
                        warn!(error = %err, "Stored session could not be resumed");
                        self.client.sign_out().await;
                        self.forget_session();
                    }
                }
            }
            Ok(None) => self.session.finish_loading(),
            Err(err) => {
                warn!(error = %err, "Discarding unreadable stored session");
                self.forget_session();
                self.session.finish_loading();
            }
        }
        self.navigate(path)
    }

    /// Resolve `path` against the session; unknown paths land on the dashboard
    pub fn navigate(&self, path: &str) -> RouteDecision {
        let route = Route::parse(path).unwrap_or_else(|| {
            debug!(path, "Unknown path");
            Route::Dashboard
        });
        let decision = resolve(&route, &self.session.snapshot());
        match decision {
            RouteDecision::Render => *self.route.write() = route,
            RouteDecision::Redirect(target) => *self.route.write() = target,
            RouteDecision::Loading => {}
        }
        decision
    }

    /// Load the app profile for the current session
    pub async fn load_profile(&self) -> ClientResult<User> {
        let me = self.client.refetch::<CurrentUser>(&NoVariables {}).await?.me;
        if me.is_banned {
            return Err(self
                .client
                .handle_ban(BANNED_PROFILE_MESSAGE.to_string())
                .await);
        }
        self.session.set_profile(me.clone());
        self.persist_session();
        Ok(me)
    }

    /// Route change caused by a session event, if any
    pub fn on_session_event(&self, event: &SessionEvent) -> Option<Route> {
        match event {
            SessionEvent::SignedIn(_) | SessionEvent::Refreshed => {
                self.persist_session();
                None
            }
            SessionEvent::Banned(message) => {
                self.forget_session();
                *self.ban_message.write() = Some(message.clone());
                *self.route.write() = Route::Banned;
                Some(Route::Banned)
            }
            SessionEvent::SignedOut => {
                self.forget_session();
                let mut route = self.route.write();
                if route.is_public() {
                    None
                } else {
                    *route = Route::Login;
                    Some(Route::Login)
                }
            }
        }
    }

    /// Apply session events in the background until the session goes away
    pub fn watch_session(self: &Arc<Self>) -> JoinHandle<()> {
        let shell = Arc::clone(self);
        let mut events = self.session.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if let Some(route) = shell.on_session_event(&event) {
                            info!(route = %route, "Session change moved the user");
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Session events lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    pub fn auth_screen(&self) -> AuthScreen {
        AuthScreen::new(
            self.client.clone(),
            self.config.identity.clone(),
            self.config.timing.invite_code_debounce(),
        )
    }

    pub fn calendar_screen(&self) -> ClientResult<CalendarScreen> {
        let callback = self.config.identity.redirect_to(&Route::CalendarCallback.path())?;
        Ok(CalendarScreen::new(
            self.client.clone(),
            self.storage.clone(),
            callback,
        ))
    }

    pub fn ratings_screen(&self) -> RatingsScreen {
        RatingsScreen::new(self.client.clone(), self.storage.clone())
    }

    /// Sign in and go to the role's home screen
    pub async fn sign_in(&self, form: &LoginForm) -> Result<Route, Notice> {
        self.try_sign_in(form).await.map_err(|err| sign_in_notice(&err))
    }

    pub async fn try_sign_in(&self, form: &LoginForm) -> ClientResult<Route> {
        self.auth_screen().authenticate(form).await?;
        let me = self.load_profile().await?;
        let home = home_for(me.role);
        *self.route.write() = home;
        Ok(home)
    }

    pub async fn sign_out(&self) -> Route {
        self.client.sign_out().await;
        self.forget_session();
        *self.route.write() = Route::Login;
        Route::Login
    }

    /// Finish a redirect back from the identity service
    pub async fn complete_auth_callback(&self, url: &Url) -> Result<Route, Notice> {
        let callback = AuthCallback::parse(url).map_err(Notice::from)?;
        let kind = self.session.apply_callback(callback).map_err(Notice::from)?;
        let me = self.load_profile().await.map_err(Notice::from)?;

        let next = match kind {
            CallbackKind::Recovery => Route::UpdatePassword,
            _ => home_for(me.role),
        };
        *self.route.write() = next;
        Ok(next)
    }

    /// Finish the Google Calendar consent round-trip and go back where it started
    pub async fn complete_calendar_callback(
        &self,
        url: &Url,
    ) -> Result<(RouteDecision, GoogleSync), Notice> {
        let screen = self.calendar_screen().map_err(Notice::from)?;
        let sync = screen.complete_google(url).await.map_err(Notice::from)?;
        if self.session.user().is_none() {
            self.load_profile().await.map_err(Notice::from)?;
        }
        Ok((self.navigate(&sync.redirect), sync))
    }

    pub fn sidebar(&self) -> Option<Sidebar> {
        let role = self.session.role()?;
        Some(Sidebar::for_role(role, &self.current_route()))
    }

    /// Header for the signed-in user, with their organization when they have one
    pub async fn header(&self) -> ClientResult<Option<Header>> {
        let Some(user) = self.session.user() else {
            return Ok(None);
        };
        let organization = match user.organization_id {
            Some(id) => {
                self.client
                    .query::<GetOrganization>(&IdVariables { id })
                    .await?
                    .organization
            }
            None => None,
        };
        Ok(Some(Header::new(&user, organization.as_ref())))
    }

    fn persist_session(&self) {
        let Some(session) = self.session.session() else {
            return;
        };
        if let Err(err) = write_json(self.storage.as_ref(), keys::AUTH_SESSION, &session) {
            warn!(error = %err, "Failed to store session");
        }
    }

    fn forget_session(&self) {
        self.storage.remove(keys::AUTH_SESSION);
    }
}

impl std::fmt::Debug for AppShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppShell")
            .field("route", &self.current_route())
            .field("session", &self.session)
            .field("config", &"AppConfig")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{callback_token, user_json, Harness};
    use pairing_core::AppRole;
    use serde_json::json;

    fn shell(h: &Harness) -> (AppShell, Arc<MemorySessionStorage>) {
        let storage = Arc::new(MemorySessionStorage::new());
        let config = AppConfig::for_endpoints(
            "http://localhost:4000/graphql",
            "http://localhost:9999",
            "anon-key",
        )
        .unwrap();
        (
            AppShell::with_parts(config, h.client.clone(), storage.clone()),
            storage,
        )
    }

    #[tokio::test]
    async fn test_bootstrap_without_session_goes_to_login() {
        let h = Harness::signed_out();
        let (shell, _) = shell(&h);

        let decision = shell.bootstrap("/pairings").await;
        assert_eq!(decision, RouteDecision::Redirect(Route::Login));
        assert_eq!(shell.current_route(), Route::Login);
    }

    #[tokio::test]
    async fn test_bootstrap_resumes_stored_session() {
        let h = Harness::signed_out();
        h.backend.on("CurrentUser", json!({ "me": user_json(&h.me) }));
        let (shell, storage) = shell(&h);
        write_json(storage.as_ref(), keys::AUTH_SESSION, &h.identity.session("stored")).unwrap();

        let decision = shell.bootstrap("/pairings").await;
        assert_eq!(decision, RouteDecision::Render);
        assert_eq!(shell.current_route(), Route::Pairings);
        assert_eq!(h.session.access_token().as_deref(), Some("stored"));
    }

    #[tokio::test]
    async fn test_banned_profile_on_resume() {
        let h = Harness::signed_out();
        let mut me = h.me.clone();
        me.is_banned = true;
        h.backend.on("CurrentUser", json!({ "me": user_json(&me) }));
        let (shell, storage) = shell(&h);
        write_json(storage.as_ref(), keys::AUTH_SESSION, &h.identity.session("stored")).unwrap();

        assert_eq!(shell.bootstrap("/").await, RouteDecision::Redirect(Route::Banned));
        assert_eq!(shell.current_route(), Route::Banned);
        assert!(storage.get(keys::AUTH_SESSION).is_none());
        assert!(!h.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_banned_profile_signs_out_only_once() {
        let h = Harness::signed_out();
        let mut me = h.me.clone();
        me.is_banned = true;
        h.backend.on("CurrentUser", json!({ "me": user_json(&me) }));
        let (shell, _) = shell(&h);
        let mut events = h.session.subscribe();

        for token in ["first", "second"] {
            h.session.restore(h.identity.session(token));
            assert!(shell.load_profile().await.unwrap_err().is_banned());
        }

        let mut banned = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, SessionEvent::Banned(_)) {
                banned += 1;
            }
        }
        assert_eq!(banned, 1);
        assert_eq!(h.identity.sign_outs.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sign_in_lands_on_role_home() {
        let mut h = Harness::signed_out();
        h.me.role = AppRole::OrgAdmin;
        h.backend.on("CurrentUser", json!({ "me": user_json(&h.me) }));
        let (shell, storage) = shell(&h);
        shell.bootstrap("/login").await;

        let form = LoginForm {
            email: "ada@example.com".into(),
            password: "secret".into(),
        };
        assert_eq!(shell.sign_in(&form).await.unwrap(), Route::Statistics);
        assert!(storage.get(keys::AUTH_SESSION).is_some());
        assert_eq!(shell.navigate("/login"), RouteDecision::Redirect(Route::Statistics));
    }

    #[tokio::test]
    async fn test_plain_user_is_kept_out_of_admin() {
        let h = Harness::signed_in(AppRole::User);
        let (shell, _) = shell(&h);

        assert_eq!(
            shell.navigate("/admin/users"),
            RouteDecision::Redirect(Route::AccessDenied)
        );
        assert_eq!(shell.navigate("/no/such/page"), RouteDecision::Render);
        assert_eq!(shell.current_route(), Route::Dashboard);
    }

    #[tokio::test]
    async fn test_ban_moves_to_banned_screen() {
        let h = Harness::signed_in(AppRole::User);
        h.backend.fail("MyPairings", "User is banned", Some("FORBIDDEN"));
        let (shell, storage) = shell(&h);
        let shell = Arc::new(shell);
        shell.navigate("/pairings");
        let mut events = h.session.subscribe();

        let err = h
            .client
            .query::<pairing_client::operations::MyPairings>(&NoVariables {})
            .await
            .unwrap_err();
        assert!(err.is_banned());

        let event = events.recv().await.unwrap();
        assert_eq!(shell.on_session_event(&event), Some(Route::Banned));
        assert_eq!(shell.ban_message().as_deref(), Some("User is banned"));
        assert!(storage.get(keys::AUTH_SESSION).is_none());
    }

    #[tokio::test]
    async fn test_sign_out_from_protected_route() {
        let h = Harness::signed_in(AppRole::User);
        let (shell, _) = shell(&h);
        shell.navigate("/calendar");

        assert_eq!(shell.on_session_event(&SessionEvent::SignedOut), Some(Route::Login));
        assert_eq!(shell.on_session_event(&SessionEvent::SignedOut), None);
    }

    #[tokio::test]
    async fn test_recovery_callback_goes_to_update_password() {
        let h = Harness::signed_out();
        h.backend.on("CurrentUser", json!({ "me": user_json(&h.me) }));
        let (shell, _) = shell(&h);

        let token = callback_token(h.me.id);
        let url = Url::parse(&format!(
            "http://localhost:5173/auth/callback#access_token={token}&refresh_token=r&type=recovery"
        ))
        .unwrap();

        assert_eq!(
            shell.complete_auth_callback(&url).await.unwrap(),
            Route::UpdatePassword
        );
    }

    #[tokio::test]
    async fn test_header_includes_organization() {
        let h = Harness::signed_in(AppRole::User);
        h.backend.on(
            "GetOrganization",
            json!({ "organization": {
                "id": h.me.organization_id, "name": "Analytical Engines", "description": null,
                "inviteCode": null, "memberCount": 3, "createdAt": "2025-01-01T00:00:00Z"
            } }),
        );
        let (shell, _) = shell(&h);

        let header = shell.header().await.unwrap().unwrap();
        assert_eq!(header.initials, "AL");
        assert_eq!(header.organization.as_deref(), Some("Analytical Engines"));
    }
}
