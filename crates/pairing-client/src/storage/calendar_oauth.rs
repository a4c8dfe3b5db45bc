//! Google Calendar OAuth handoff
//!
//! Granting calendar access goes through a second OAuth sign-in, which
//! replaces the app session. Before leaving, the current session and the
//! page to come back to are parked in session storage; on return the
//! provider token is kept and the parked session is handed back for restore.

use std::sync::Arc;

use pairing_core::{read_json, write_json, SessionStorage};
use tracing::{debug, info, warn};
use url::Url;

use super::keys;
use crate::error::{ClientError, ClientResult};
use crate::identity::{AuthCallback, AuthSession, IdentityProvider, OAuthRequest};

/// OAuth scope granting calendar access
pub const GOOGLE_CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

const PROVIDER: &str = "google";

/// What the calendar callback yields
#[derive(Debug, Clone)]
pub struct CalendarOAuthOutcome {
    /// Google access token for `SyncGoogleCalendar`
    pub access_token: String,
    /// Session that was active before the round-trip
    pub restore_session: Option<AuthSession>,
    /// In-app path to navigate back to
    pub redirect: String,
}

/// Session-storage slots for the calendar OAuth round-trip
#[derive(Clone)]
pub struct CalendarOAuthHandoff {
    storage: Arc<dyn SessionStorage>,
}

impl CalendarOAuthHandoff {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    /// Park the session and return the URL to send the browser to
    pub fn begin(
        &self,
        provider: &dyn IdentityProvider,
        session: Option<&AuthSession>,
        return_to: &str,
        callback_url: Url,
    ) -> ClientResult<Url> {
        if let Some(session) = session {
            write_json(
                self.storage.as_ref(),
                keys::CALENDAR_OAUTH_RESTORE_SESSION,
                session,
            )?;
        }
        self.storage
            .set(keys::CALENDAR_OAUTH_REDIRECT, return_to.to_string());
        self.storage
            .set(keys::CALENDAR_OAUTH_IN_PROGRESS, "true".to_string());

        let request = OAuthRequest::new(PROVIDER, callback_url)
            .scope(GOOGLE_CALENDAR_SCOPE)
            .param("access_type", "offline")
            .param("prompt", "consent");
        let url = provider.authorize_url(&request)?;
        info!(return_to, "Calendar authorization started");
        Ok(url)
    }

    pub fn is_in_progress(&self) -> bool {
        self.storage.get(keys::CALENDAR_OAUTH_IN_PROGRESS).as_deref() == Some("true")
    }

    /// Consume the callback, keep the calendar token and clear the handoff slots.
    ///
    /// A callback without a provider token leaves the slots in place; use
    /// [`abandon`](Self::abandon) to get the parked session back.
    pub fn complete(&self, callback: &AuthCallback) -> ClientResult<CalendarOAuthOutcome> {
        if !self.is_in_progress() {
            return Err(ClientError::NoCalendarHandoff);
        }
        let access_token = callback
            .provider_token
            .clone()
            .ok_or_else(|| ClientError::Decode("calendar callback has no provider token".into()))?;

        let restore_session = read_json::<AuthSession>(
            self.storage.as_ref(),
            keys::CALENDAR_OAUTH_RESTORE_SESSION,
        )?;
        let redirect = self
            .storage
            .get(keys::CALENDAR_OAUTH_REDIRECT)
            .unwrap_or_else(|| "/calendar".to_string());
        self.clear();
        self.storage
            .set(keys::GOOGLE_CALENDAR_ACCESS_TOKEN, access_token.clone());

        debug!(redirect = %redirect, "Calendar authorization completed");
        Ok(CalendarOAuthOutcome {
            access_token,
            restore_session,
            redirect,
        })
    }

    /// Give up on the round-trip and hand back the parked session
    pub fn abandon(&self) -> Option<AuthSession> {
        let parked = read_json::<AuthSession>(
            self.storage.as_ref(),
            keys::CALENDAR_OAUTH_RESTORE_SESSION,
        )
        .unwrap_or_else(|err| {
            warn!(error = %err, "Parked session is unreadable");
            None
        });
        if self.is_in_progress() {
            info!("Calendar authorization abandoned");
        }
        self.clear();
        parked
    }

    /// Drop the handoff slots without touching the calendar token
    pub fn clear(&self) {
        self.storage.remove(keys::CALENDAR_OAUTH_RESTORE_SESSION);
        self.storage.remove(keys::CALENDAR_OAUTH_REDIRECT);
        self.storage.remove(keys::CALENDAR_OAUTH_IN_PROGRESS);
    }

    pub fn access_token(&self) -> Option<String> {
        self.storage.get(keys::GOOGLE_CALENDAR_ACCESS_TOKEN)
    }

    /// Read and forget the calendar token
    pub fn take_access_token(&self) -> Option<String> {
        self.storage.remove(keys::GOOGLE_CALENDAR_ACCESS_TOKEN)
    }
}
