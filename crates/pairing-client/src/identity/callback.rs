//! Redirect callback parsing
//!
//! After OAuth, email verification or password recovery the identity service
//! redirects back with tokens in the URL fragment:
//! `#access_token=..&refresh_token=..&expires_in=..&token_type=bearer&type=recovery`.
//! Failures come back as `error` / `error_description`, in the query or the fragment.

use std::collections::HashMap;

use chrono::Utc;
use pairing_common::SessionClaims;

use super::provider::{AuthSession, IdentityUser};
use crate::error::{ClientError, ClientResult};

/// Why the identity service redirected back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    /// OAuth or password sign-in
    SignIn,
    /// Email verification link after sign-up
    Signup,
    /// Password recovery link; the user should pick a new password next
    Recovery,
    MagicLink,
    Invite,
}

impl CallbackKind {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("signup") => Self::Signup,
            Some("recovery") => Self::Recovery,
            Some("magiclink") => Self::MagicLink,
            Some("invite") => Self::Invite,
            _ => Self::SignIn,
        }
    }
}

/// Parsed redirect callback
#[derive(Clone)]
pub struct AuthCallback {
    pub kind: CallbackKind,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
    pub provider_token: Option<String>,
}

impl std::fmt::Debug for AuthCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthCallback")
            .field("kind", &self.kind)
            .field("expires_in", &self.expires_in)
            .field("has_provider_token", &self.provider_token.is_some())
            .finish_non_exhaustive()
    }
}

impl AuthCallback {
    /// Parse the callback URL the browser landed on
    pub fn parse(url: &url::Url) -> ClientResult<Self> {
        let mut params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        if let Some(fragment) = url.fragment() {
            params.extend(url::form_urlencoded::parse(fragment.as_bytes()).into_owned());
        }

        if let Some(error) = params.get("error") {
            let message = params
                .get("error_description")
                .cloned()
                .unwrap_or_else(|| error.clone());
            return Err(ClientError::Identity {
                status: 400,
                message,
            });
        }

        let take = |key: &str| {
            params
                .get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| ClientError::Decode(format!("callback is missing `{key}`")))
        };

        Ok(Self {
            kind: CallbackKind::parse(params.get("type").map(String::as_str)),
            access_token: take("access_token")?,
            refresh_token: take("refresh_token")?,
            expires_in: params
                .get("expires_in")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            token_type: params
                .get("token_type")
                .cloned()
                .unwrap_or_else(|| "bearer".to_string()),
            provider_token: params.get("provider_token").filter(|v| !v.is_empty()).cloned(),
        })
    }

    /// Build a session, reading the user from the access-token claims
    pub fn into_session(self) -> ClientResult<AuthSession> {
        let claims = SessionClaims::decode_unverified(&self.access_token)
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        let session = AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type,
            expires_in: self.expires_in,
            expires_at: Some(claims.exp),
            user: IdentityUser {
                id: claims.sub,
                email: claims.email,
                email_confirmed_at: None,
            },
            provider_token: self.provider_token,
        };
        Ok(session.with_expiry_from(Utc::now()))
    }
}
