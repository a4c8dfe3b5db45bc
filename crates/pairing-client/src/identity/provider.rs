//! Identity provider port and its data types

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::ClientResult;

/// User record as known by the identity provider (not the app profile)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
}

/// Tokens issued by the identity provider
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds at issue time
    pub expires_in: i64,
    /// Absolute expiry (Unix timestamp)
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: IdentityUser,
    /// Third-party OAuth token (e.g. Google) when the sign-in went through a provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_token: Option<String>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl AuthSession {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
    }

    /// Fill `expires_at` from `expires_in` when the provider omitted it
    pub fn with_expiry_from(mut self, issued_at: DateTime<Utc>) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = Some(issued_at.timestamp() + self.expires_in);
        }
        self
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .field("has_provider_token", &self.provider_token.is_some())
            .finish_non_exhaustive()
    }
}

/// Account creation request; profile fields travel as user metadata
#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub invite_code: Option<String>,
    /// Where the email verification link should land
    pub redirect_to: Url,
}

/// Result of a sign-up: with email confirmation enabled there is no session yet
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    SignedIn(AuthSession),
    ConfirmationSent { user: IdentityUser },
}

/// Third-party OAuth sign-in
#[derive(Debug, Clone)]
pub struct OAuthRequest {
    pub provider: String,
    pub scopes: Vec<String>,
    pub redirect_to: Url,
    /// Extra provider query parameters (e.g. `access_type=offline`)
    pub query_params: Vec<(String, String)>,
}

impl OAuthRequest {
    pub fn new(provider: impl Into<String>, redirect_to: Url) -> Self {
        Self {
            provider: provider.into(),
            scopes: Vec::new(),
            redirect_to,
            query_params: Vec::new(),
        }
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.push(scope.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }
}

/// Session issuance delegated to a third-party identity service
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> ClientResult<AuthSession>;

    async fn sign_up(&self, request: &SignUpRequest) -> ClientResult<SignUpOutcome>;

    async fn refresh(&self, refresh_token: &str) -> ClientResult<AuthSession>;

    async fn sign_out(&self, access_token: &str) -> ClientResult<()>;

    async fn request_password_reset(&self, email: &str, redirect_to: &Url) -> ClientResult<()>;

    async fn update_password(&self, access_token: &str, new_password: &str) -> ClientResult<()>;

    /// URL the browser is sent to for an OAuth sign-in
    fn authorize_url(&self, request: &OAuthRequest) -> ClientResult<Url>;
}
