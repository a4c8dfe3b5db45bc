//! Test doubles shared by the screen and shell tests

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use pairing_client::graphql::GraphqlRequest;
use pairing_client::identity::{IdentityUser, OAuthRequest, SignUpOutcome, SignUpRequest};
use pairing_client::{
    AuthSession, ClientError, ClientResult, GraphqlClient, GraphqlTransport, IdentityProvider,
    SessionContext,
};
use pairing_common::SessionClaims;
use pairing_core::{AppRole, User};
use parking_lot::Mutex;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

type Scripted = Result<Value, (String, Option<String>)>;

/// GraphQL backend double: scripted `data` per operation, every request recorded
#[derive(Default)]
pub(crate) struct FakeBackend {
    responses: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<GraphqlRequest>>,
}

impl FakeBackend {
    /// Answer `operation` with `data`; the last scripted answer repeats
    pub(crate) fn on(&self, operation: &str, data: Value) {
        self.push(operation, Ok(data));
    }

    pub(crate) fn fail(&self, operation: &str, message: &str, code: Option<&str>) {
        self.push(
            operation,
            Err((message.to_string(), code.map(ToString::to_string))),
        );
    }

    fn push(&self, operation: &str, answer: Scripted) {
        self.responses
            .lock()
            .entry(operation.to_string())
            .or_default()
            .push_back(answer);
    }

    pub(crate) fn calls(&self, operation: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.operation_name == operation)
            .count()
    }

    pub(crate) fn last_variables(&self, operation: &str) -> Option<Value> {
        self.requests
            .lock()
            .iter()
            .rev()
            .find(|r| r.operation_name == operation)
            .map(|r| r.variables.clone())
    }
}

#[async_trait]
impl GraphqlTransport for FakeBackend {
    async fn execute(&self, request: &GraphqlRequest, _: Option<&str>) -> ClientResult<Value> {
        self.requests.lock().push(request.clone());

        let mut responses = self.responses.lock();
        let queue = responses.get_mut(&request.operation_name);
        let answer = match queue {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        match answer {
            Some(Ok(data)) => Ok(data),
            Some(Err((message, code))) => Err(ClientError::from_graphql(message, code.as_deref(), 200)),
            None => Err(ClientError::Graphql {
                message: format!("no response scripted for {}", request.operation_name),
                code: None,
            }),
        }
    }
}

/// Identity provider double for one user
pub(crate) struct StubIdentity {
    pub user_id: Uuid,
    pub sign_outs: AtomicUsize,
}

impl StubIdentity {
    pub(crate) fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            sign_outs: AtomicUsize::new(0),
        }
    }

    pub(crate) fn session(&self, token: &str) -> AuthSession {
        AuthSession {
            access_token: token.to_string(),
            refresh_token: format!("refresh-{token}"),
            token_type: "bearer".into(),
            expires_in: 3600,
            expires_at: None,
            user: IdentityUser {
                id: self.user_id,
                email: Some("ada@example.com".into()),
                email_confirmed_at: None,
            },
            provider_token: None,
        }
    }
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn sign_in_with_password(&self, _: &str, password: &str) -> ClientResult<AuthSession> {
        if password == "wrong" {
            return Err(ClientError::InvalidCredentials);
        }
        Ok(self.session("signed-in"))
    }

    async fn sign_up(&self, _: &SignUpRequest) -> ClientResult<SignUpOutcome> {
        Ok(SignUpOutcome::ConfirmationSent {
            user: self.session("unused").user,
        })
    }

    async fn refresh(&self, _: &str) -> ClientResult<AuthSession> {
        Ok(self.session("refreshed"))
    }

    async fn sign_out(&self, _: &str) -> ClientResult<()> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn request_password_reset(&self, _: &str, _: &Url) -> ClientResult<()> {
        Ok(())
    }

    async fn update_password(&self, _: &str, _: &str) -> ClientResult<()> {
        Ok(())
    }

    fn authorize_url(&self, request: &OAuthRequest) -> ClientResult<Url> {
        let mut url = Url::parse("https://id.example.com/authorize").unwrap();
        url.query_pairs_mut()
            .append_pair("provider", &request.provider)
            .append_pair("redirect_to", request.redirect_to.as_str());
        Ok(url)
    }
}

pub(crate) fn user(id: Uuid, role: AppRole) -> User {
    User {
        id,
        email: "ada@example.com".into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        role,
        organization_id: Some(Uuid::from_u128(7)),
        is_banned: false,
        avatar_url: None,
        bio: None,
        created_at: Utc::now(),
    }
}

/// Access token the identity service would put in a redirect callback
pub(crate) fn callback_token(user_id: Uuid) -> String {
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: user_id,
        email: Some("ada@example.com".into()),
        exp: now + 3600,
        iat: now,
        role: Some("authenticated".into()),
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(b"identity-service-secret"),
    )
    .unwrap()
}

pub(crate) fn user_json(user: &User) -> Value {
    serde_json::to_value(user).unwrap()
}

/// Everything a screen needs, signed in as a user with `role`
pub(crate) struct Harness {
    pub backend: Arc<FakeBackend>,
    pub identity: Arc<StubIdentity>,
    pub session: Arc<SessionContext>,
    pub client: Arc<GraphqlClient>,
    pub me: User,
}

impl Harness {
    pub(crate) fn signed_in(role: AppRole) -> Self {
        let harness = Self::with_role(role);
        harness
            .session
            .restore(harness.identity.session("initial"));
        harness.session.set_profile(harness.me.clone());
        harness
    }

    pub(crate) fn signed_out() -> Self {
        Self::with_role(AppRole::User)
    }

    fn with_role(role: AppRole) -> Self {
        let me = user(Uuid::new_v4(), role);
        let backend = Arc::new(FakeBackend::default());
        let identity = Arc::new(StubIdentity::new(me.id));
        let session = Arc::new(SessionContext::new(identity.clone()));
        let client = Arc::new(GraphqlClient::new(backend.clone(), session.clone()));
        Self {
            backend,
            identity,
            session,
            client,
            me,
        }
    }
}
