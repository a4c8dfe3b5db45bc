//! GraphQL client
//!
//! Wraps a transport with the session token, the query cache, one
//! refresh-and-replay on `UNAUTHENTICATED`, and the banned-account guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pairing_common::GraphqlConfig;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::cache::{CacheKey, QueryCache};
use super::operation::{GraphqlRequest, Operation};
use super::transport::{GraphqlTransport, HttpTransport};
use crate::error::{ClientError, ClientResult};
use crate::identity::SessionContext;

/// Fires the banned-account sign-out at most once per client
#[derive(Debug, Default)]
pub struct BanGuard {
    fired: AtomicBool,
}

impl BanGuard {
    /// Returns true only for the first caller
    pub fn trip(&self) -> bool {
        !self.fired.swap(true, Ordering::SeqCst)
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

/// Typed GraphQL client bound to a session
pub struct GraphqlClient {
    transport: Arc<dyn GraphqlTransport>,
    session: Arc<SessionContext>,
    cache: QueryCache,
    ban_guard: BanGuard,
}

impl GraphqlClient {
    pub fn new(transport: Arc<dyn GraphqlTransport>, session: Arc<SessionContext>) -> Self {
        Self {
            transport,
            session,
            cache: QueryCache::new(),
            ban_guard: BanGuard::default(),
        }
    }

    /// Client over HTTP for the configured endpoint
    pub fn http(config: &GraphqlConfig, session: Arc<SessionContext>) -> ClientResult<Self> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(Arc::new(transport), session))
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn ban_guard(&self) -> &BanGuard {
        &self.ban_guard
    }

    /// Cache-first query
    #[instrument(skip_all, fields(operation = O::NAME))]
    pub async fn query<O: Operation>(&self, variables: &O::Variables) -> ClientResult<O::Data> {
        let request = GraphqlRequest::of::<O>(variables)?;
        let key = CacheKey::new(O::NAME, &request.variables);

        if let Some(cached) = self.cache.get(&key) {
            debug!("Cache hit");
            return decode(cached);
        }

        let data = self.execute(&request).await?;
        self.cache.put(key, data.clone());
        decode(data)
    }

    /// Network-only query; refreshes the cached entry
    #[instrument(skip_all, fields(operation = O::NAME))]
    pub async fn refetch<O: Operation>(&self, variables: &O::Variables) -> ClientResult<O::Data> {
        let request = GraphqlRequest::of::<O>(variables)?;
        let key = CacheKey::new(O::NAME, &request.variables);

        let data = self.execute(&request).await?;
        self.cache.put(key, data.clone());
        decode(data)
    }

    /// Run a mutation, then evict the queries it makes stale
    #[instrument(skip_all, fields(operation = O::NAME))]
    pub async fn mutate<O: Operation>(&self, variables: &O::Variables) -> ClientResult<O::Data> {
        let request = GraphqlRequest::of::<O>(variables)?;
        let data = self.execute(&request).await?;
        self.cache.invalidate(O::INVALIDATES);
        decode(data)
    }

    /// Sign out and forget every cached result
    pub async fn sign_out(&self) {
        self.session.sign_out().await;
        self.cache.clear();
    }

    async fn execute(&self, request: &GraphqlRequest) -> ClientResult<serde_json::Value> {
        let result = self.execute_with_refresh(request).await;
        match result {
            Err(ClientError::Banned(message)) => Err(self.handle_ban(message).await),
            other => other,
        }
    }

    async fn execute_with_refresh(
        &self,
        request: &GraphqlRequest,
    ) -> ClientResult<serde_json::Value> {
        let token = self.session.access_token();
        let first = self.transport.execute(request, token.as_deref()).await;

        let original = match first {
            Err(err) if err.is_unauthenticated() && token.is_some() => err,
            other => return other,
        };

        match self.session.refresh_after(token.as_deref()).await {
            Ok(session) => {
                debug!("Replaying after session refresh");
                // A second UNAUTHENTICATED is returned as is
                self.transport
                    .execute(request, Some(&session.access_token))
                    .await
            }
            Err(refresh_err) => {
                warn!(error = %refresh_err, "Refresh failed; surfacing original error");
                Err(original)
            }
        }
    }

    /// Sign out once per client lifetime for a banned account
    pub async fn handle_ban(&self, message: String) -> ClientError {
        if self.ban_guard.trip() {
            info!(%message, "Account banned; signing out");
            self.session.sign_out_banned(&message).await;
            self.cache.clear();
        }
        ClientError::Banned(message)
    }
}

fn decode<T: DeserializeOwned>(data: serde_json::Value) -> ClientResult<T> {
    serde_json::from_value(data).map_err(Into::into)
}
