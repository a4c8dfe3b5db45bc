//! REST adapter for the hosted identity service
//!
//! Endpoints (relative to `IDENTITY_URL`):
//! - `POST token?grant_type=password` / `POST token?grant_type=refresh_token`
//! - `POST signup`, `POST logout`, `POST recover`, `PUT user`
//! - `GET authorize` (browser redirect, only the URL is built here)
//!
//! Every request carries the public API key in the `apikey` header.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use pairing_common::IdentityConfig;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::provider::{
    AuthSession, IdentityProvider, IdentityUser, OAuthRequest, SignUpOutcome, SignUpRequest,
};
use crate::error::{ClientError, ClientResult};

/// Error body variants returned by the identity service
#[derive(Debug, Default, Deserialize)]
struct IdentityErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl IdentityErrorBody {
    fn message(&self) -> Option<String> {
        self.error_description
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.message.clone())
            .or_else(|| self.error.clone())
    }
}

/// Identity provider speaking the hosted auth REST API
#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl HttpIdentityProvider {
    pub fn new(base_url: Url, api_key: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &IdentityConfig, timeout: Duration) -> ClientResult<Self> {
        Self::new(config.url.clone(), config.api_key.clone(), timeout)
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Decode(format!("identity URL {} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .push(path);
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
    }

    async fn token(&self, grant_type: &str, body: serde_json::Value) -> ClientResult<AuthSession> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);

        let response = self
            .request(reqwest::Method::POST, url)
            .json(&body)
            .send()
            .await?;
        let response = check(response).await?;
        let session: AuthSession = response.json().await?;
        Ok(session.with_expiry_from(Utc::now()))
    }
}

/// Pass successful responses through; map the rest to `ClientError`
async fn check(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: IdentityErrorBody = response.json().await.unwrap_or_default();
    if body.error.as_deref() == Some("invalid_grant") && status.as_u16() == 400 {
        return Err(ClientError::InvalidCredentials);
    }

    let message = body.message().unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("identity request failed")
            .to_string()
    });
    warn!(status = status.as_u16(), %message, "Identity request rejected");
    Err(ClientError::Identity {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[instrument(skip(self, password))]
    async fn sign_in_with_password(&self, email: &str, password: &str) -> ClientResult<AuthSession> {
        let session = self
            .token("password", json!({ "email": email, "password": password }))
            .await?;
        info!(user_id = %session.user.id, "Signed in with password");
        Ok(session)
    }

    #[instrument(skip_all, fields(email = %request.email))]
    async fn sign_up(&self, request: &SignUpRequest) -> ClientResult<SignUpOutcome> {
        let mut url = self.endpoint("signup")?;
        url.query_pairs_mut()
            .append_pair("redirect_to", request.redirect_to.as_str());

        let body = json!({
            "email": request.email,
            "password": request.password,
            "data": {
                "first_name": request.first_name,
                "last_name": request.last_name,
                "invite_code": request.invite_code,
            },
        });

        let response = self
            .request(reqwest::Method::POST, url)
            .json(&body)
            .send()
            .await?;
        let value: serde_json::Value = check(response).await?.json().await?;

        // Auto-confirmed projects return a full session, others just the user
        if value.get("access_token").is_some() {
            let session: AuthSession = serde_json::from_value(value)?;
            return Ok(SignUpOutcome::SignedIn(session.with_expiry_from(Utc::now())));
        }
        let user_value = value.get("user").cloned().unwrap_or(value);
        let user: IdentityUser = serde_json::from_value(user_value)?;
        debug!(user_id = %user.id, "Sign-up awaiting email confirmation");
        Ok(SignUpOutcome::ConfirmationSent { user })
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &str) -> ClientResult<AuthSession> {
        self.token("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> ClientResult<()> {
        let response = self
            .request(reqwest::Method::POST, self.endpoint("logout")?)
            .bearer_auth(access_token)
            .send()
            .await?;
        check(response).await.map(|_| ())
    }

    #[instrument(skip(self))]
    async fn request_password_reset(&self, email: &str, redirect_to: &Url) -> ClientResult<()> {
        let mut url = self.endpoint("recover")?;
        url.query_pairs_mut()
            .append_pair("redirect_to", redirect_to.as_str());

        let response = self
            .request(reqwest::Method::POST, url)
            .json(&json!({ "email": email }))
            .send()
            .await?;
        check(response).await.map(|_| ())
    }

    #[instrument(skip_all)]
    async fn update_password(&self, access_token: &str, new_password: &str) -> ClientResult<()> {
        let response = self
            .request(reqwest::Method::PUT, self.endpoint("user")?)
            .bearer_auth(access_token)
            .json(&json!({ "password": new_password }))
            .send()
            .await?;
        check(response).await.map(|_| ())
    }

    fn authorize_url(&self, request: &OAuthRequest) -> ClientResult<Url> {
        let mut url = self.endpoint("authorize")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("provider", &request.provider)
                .append_pair("redirect_to", request.redirect_to.as_str());
            if !request.scopes.is_empty() {
                query.append_pair("scopes", &request.scopes.join(" "));
            }
            for (key, value) in &request.query_params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }
}
