//! Session context - the ambient auth state every screen reads
//!
//! Holds the identity session, the app profile loaded from `CurrentUser`,
//! and a loading flag that stays up until both are settled. State changes
//! are broadcast as `SessionEvent`s.

use std::sync::Arc;

use parking_lot::RwLock;
use pairing_core::{AppRole, User};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, instrument, warn};
use url::Url;
use uuid::Uuid;

use super::callback::{AuthCallback, CallbackKind};
use super::provider::{AuthSession, IdentityProvider, SignUpOutcome, SignUpRequest};
use crate::error::{ClientError, ClientResult};

const EVENT_CAPACITY: usize = 32;

/// Session lifecycle notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Uuid),
    SignedOut,
    Refreshed,
    /// Signed out because the account is banned; carries the server message
    Banned(String),
}

/// Point-in-time view used for routing and layout decisions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub loading: bool,
    pub user_id: Option<Uuid>,
    pub role: Option<AppRole>,
    pub organization_id: Option<Uuid>,
    pub display_name: Option<String>,
}

impl SessionSnapshot {
    #[inline]
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

#[derive(Debug)]
struct SessionState {
    loading: bool,
    session: Option<AuthSession>,
    profile: Option<User>,
}

/// Shared auth state backed by an identity provider
pub struct SessionContext {
    provider: Arc<dyn IdentityProvider>,
    state: RwLock<SessionState>,
    refresh_lock: Mutex<()>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionContext {
    /// New context in the loading state
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            provider,
            state: RwLock::new(SessionState {
                loading: true,
                session: None,
                profile: None,
            }),
            refresh_lock: Mutex::new(()),
            events,
        }
    }

    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        // No receivers is fine
        let _ = self.events.send(event);
    }

    // === Read side ===

    /// Loading until the initial session check is done and, when signed in,
    /// until the profile has been loaded
    pub fn is_loading(&self) -> bool {
        let state = self.state.read();
        state.loading || (state.session.is_some() && state.profile.is_none())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().session.is_some()
    }

    pub fn session(&self) -> Option<AuthSession> {
        self.state.read().session.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state
            .read()
            .session
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.state.read().session.as_ref().map(AuthSession::user_id)
    }

    /// App profile from `CurrentUser`
    pub fn user(&self) -> Option<User> {
        self.state.read().profile.clone()
    }

    pub fn role(&self) -> Option<AppRole> {
        self.state.read().profile.as_ref().map(|u| u.role)
    }

    pub fn organization_id(&self) -> Option<Uuid> {
        self.state
            .read()
            .profile
            .as_ref()
            .and_then(|u| u.organization_id)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read();
        let profile = state.profile.as_ref();
        SessionSnapshot {
            loading: state.loading || (state.session.is_some() && profile.is_none()),
            user_id: state.session.as_ref().map(AuthSession::user_id),
            role: profile.map(|u| u.role),
            organization_id: profile.and_then(|u| u.organization_id),
            display_name: profile.map(User::display_name),
        }
    }

    // === Write side ===

    /// Initial check found no stored session
    pub fn finish_loading(&self) {
        self.state.write().loading = false;
    }

    /// Install a session obtained elsewhere (stored session, OAuth restore)
    pub fn restore(&self, session: AuthSession) {
        let user_id = session.user_id();
        self.install(session);
        debug!(%user_id, "Session restored");
        self.emit(SessionEvent::SignedIn(user_id));
    }

    fn install(&self, session: AuthSession) {
        let mut state = self.state.write();
        let same_user = state
            .session
            .as_ref()
            .is_some_and(|s| s.user_id() == session.user_id());
        if !same_user {
            state.profile = None;
        }
        state.session = Some(session);
        state.loading = false;
    }

    /// Store the profile loaded from `CurrentUser`
    pub fn set_profile(&self, user: User) {
        let mut state = self.state.write();
        if state.session.as_ref().is_some_and(|s| s.user_id() != user.id) {
            warn!(profile_id = %user.id, "Ignoring profile of a different user");
            return;
        }
        state.profile = Some(user);
    }

    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<AuthSession> {
        let session = self.provider.sign_in_with_password(email, password).await?;
        let user_id = session.user_id();
        self.install(session.clone());
        info!(%user_id, "Signed in");
        self.emit(SessionEvent::SignedIn(user_id));
        Ok(session)
    }

    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn sign_up(&self, request: &SignUpRequest) -> ClientResult<SignUpOutcome> {
        let outcome = self.provider.sign_up(request).await?;
        if let SignUpOutcome::SignedIn(session) = &outcome {
            let user_id = session.user_id();
            self.install(session.clone());
            self.emit(SessionEvent::SignedIn(user_id));
        }
        Ok(outcome)
    }

    /// Complete a redirect back from the identity service
    pub fn apply_callback(&self, callback: AuthCallback) -> ClientResult<CallbackKind> {
        let kind = callback.kind;
        let session = callback.into_session()?;
        let user_id = session.user_id();
        self.install(session);
        info!(%user_id, ?kind, "Session established from callback");
        self.emit(SessionEvent::SignedIn(user_id));
        Ok(kind)
    }

    /// Refresh the current session
    pub async fn refresh(&self) -> ClientResult<AuthSession> {
        let current = self.access_token();
        self.refresh_after(current.as_deref()).await
    }

    /// Refresh unless the session already moved past `stale_token`
    ///
    /// Concurrent callers that failed with the same token share one refresh.
    pub async fn refresh_after(&self, stale_token: Option<&str>) -> ClientResult<AuthSession> {
        let _guard = self.refresh_lock.lock().await;

        let refresh_token = {
            let state = self.state.read();
            let session = state.session.as_ref().ok_or(ClientError::NotSignedIn)?;
            if stale_token.is_some_and(|stale| stale != session.access_token) {
                return Ok(session.clone());
            }
            session.refresh_token.clone()
        };

        match self.provider.refresh(&refresh_token).await {
            Ok(session) => {
                self.install(session.clone());
                debug!(user_id = %session.user_id(), "Session refreshed");
                self.emit(SessionEvent::Refreshed);
                Ok(session)
            }
            Err(err) => {
                warn!(error = %err, "Session refresh failed");
                if matches!(
                    err,
                    ClientError::InvalidCredentials | ClientError::Identity { .. }
                ) {
                    self.clear();
                    self.emit(SessionEvent::SignedOut);
                }
                Err(err)
            }
        }
    }

    fn clear(&self) -> Option<AuthSession> {
        let mut state = self.state.write();
        state.profile = None;
        state.loading = false;
        state.session.take()
    }

    async fn revoke(&self, session: Option<AuthSession>) {
        if let Some(session) = session {
            if let Err(e) = self.provider.sign_out(&session.access_token).await {
                warn!(error = %e, "Remote sign-out failed; local session cleared anyway");
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn sign_out(&self) {
        let previous = self.clear();
        self.revoke(previous).await;
        info!("Signed out");
        self.emit(SessionEvent::SignedOut);
    }

    /// Sign out because the server reported the account as banned
    pub async fn sign_out_banned(&self, message: &str) {
        let previous = self.clear();
        self.revoke(previous).await;
        warn!(%message, "Signed out banned account");
        self.emit(SessionEvent::Banned(message.to_string()));
    }

    pub async fn request_password_reset(&self, email: &str, redirect_to: &Url) -> ClientResult<()> {
        self.provider.request_password_reset(email, redirect_to).await
    }

    pub async fn update_password(&self, new_password: &str) -> ClientResult<()> {
        let token = self.access_token().ok_or(ClientError::NotSignedIn)?;
        self.provider.update_password(&token, new_password).await
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}
