//! Test helpers for integration tests
//!
//! `TestServer` runs a fake backend on an ephemeral local port:
//! - `POST /graphql` answers scripted data per operation name
//! - `GET /graphql` speaks `graphql-transport-ws` and relays pushed events
//! - `/auth/v1/*` is a minimal identity service with password and refresh grants

use std::borrow::Cow;
use std::collections::{HashMap, HashSet, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use pairing_app::AppShell;
use pairing_client::forms::LoginForm;
use pairing_client::graphql::GraphqlRequest;
use pairing_common::AppConfig;
use pairing_core::{AppRole, User};
use pairing_realtime::protocol::SUBPROTOCOL;
use pairing_realtime::ProtocolMessage;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::fixtures::{Account, TEST_API_KEY};

/// Lifetime of issued access tokens, in seconds
const TOKEN_TTL_SECS: i64 = 3600;

/// One GraphQL request or subscription as the backend saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub operation: String,
    pub variables: Value,
    pub token: Option<String>,
}

/// One call to the identity service
#[derive(Debug, Clone)]
pub struct IdentityCall {
    pub endpoint: &'static str,
    pub query: HashMap<String, String>,
    pub body: Value,
}

#[derive(Debug, Clone)]
enum Answer {
    Data(Value),
    Error {
        message: String,
        code: Option<String>,
    },
}

#[derive(Debug, Clone)]
enum Push {
    Event { operation: String, data: Value },
    Close { code: u16, reason: String },
}

/// Shared state behind every fake endpoint
pub struct FakeBackend {
    answers: Mutex<HashMap<String, VecDeque<Answer>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    accounts: Mutex<HashMap<String, Account>>,
    access_tokens: Mutex<HashMap<String, String>>,
    refresh_tokens: Mutex<HashMap<String, String>>,
    expired: Mutex<HashSet<String>>,
    identity_calls: Mutex<Vec<IdentityCall>>,
    connection_inits: Mutex<Vec<Option<Value>>>,
    subscriptions: Mutex<Vec<RecordedRequest>>,
    reject_connections: Mutex<Option<u16>>,
    pushes: broadcast::Sender<Push>,
    next_token: AtomicU64,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            answers: Mutex::default(),
            requests: Mutex::default(),
            accounts: Mutex::default(),
            access_tokens: Mutex::default(),
            refresh_tokens: Mutex::default(),
            expired: Mutex::default(),
            identity_calls: Mutex::default(),
            connection_inits: Mutex::default(),
            subscriptions: Mutex::default(),
            reject_connections: Mutex::default(),
            pushes: broadcast::channel(64).0,
            next_token: AtomicU64::new(1),
        }
    }
}

impl FakeBackend {
    // === Scripting ===

    pub fn add_account(&self, account: &Account) {
        self.accounts
            .lock()
            .insert(account.email().to_string(), account.clone());
    }

    /// Answer `operation` with `data`; the last scripted answer repeats
    pub fn on(&self, operation: &str, data: Value) {
        self.push_answer(operation, Answer::Data(data));
    }

    pub fn fail(&self, operation: &str, message: &str, code: Option<&str>) {
        self.push_answer(
            operation,
            Answer::Error {
                message: message.to_string(),
                code: code.map(ToString::to_string),
            },
        );
    }

    fn push_answer(&self, operation: &str, answer: Answer) {
        self.answers
            .lock()
            .entry(operation.to_string())
            .or_default()
            .push_back(answer);
    }

    /// Reject `token` as expired from now on
    pub fn expire(&self, token: &str) {
        self.expired.lock().insert(token.to_string());
    }

    /// Make every outstanding refresh token unusable
    pub fn revoke_refresh_tokens(&self) {
        self.refresh_tokens.lock().clear();
    }

    /// Mark the account banned; every GraphQL request it makes is refused
    pub fn ban(&self, email: &str) {
        if let Some(account) = self.accounts.lock().get_mut(email) {
            account.user.is_banned = true;
        }
    }

    /// Accept a token minted outside the token endpoint (redirect callbacks)
    pub fn adopt_token(&self, access_token: &str, account: &Account) {
        self.add_account(account);
        self.access_tokens
            .lock()
            .insert(access_token.to_string(), account.email().to_string());
    }

    /// Close every new subscription connection right after `connection_init`
    pub fn reject_connections(&self, code: u16) {
        *self.reject_connections.lock() = Some(code);
    }

    /// Deliver a subscription event to every matching live subscription
    pub fn push_event(&self, operation: &str, data: Value) {
        let _ = self.pushes.send(Push::Event {
            operation: operation.to_string(),
            data,
        });
    }

    /// Close every open subscription socket with `code`
    pub fn close_sockets(&self, code: u16, reason: &str) {
        let _ = self.pushes.send(Push::Close {
            code,
            reason: reason.to_string(),
        });
    }

    // === Inspection ===

    pub fn calls(&self, operation: &str) -> usize {
        self.requests(operation).len()
    }

    pub fn requests(&self, operation: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.operation == operation)
            .cloned()
            .collect()
    }

    pub fn identity_calls(&self, endpoint: &str) -> Vec<IdentityCall> {
        self.identity_calls
            .lock()
            .iter()
            .filter(|c| c.endpoint == endpoint)
            .cloned()
            .collect()
    }

    pub fn connection_inits(&self) -> Vec<Option<Value>> {
        self.connection_inits.lock().clone()
    }

    pub fn subscriptions(&self) -> Vec<RecordedRequest> {
        self.subscriptions.lock().clone()
    }

    pub fn password_of(&self, email: &str) -> Option<String> {
        self.accounts.lock().get(email).map(|a| a.password.clone())
    }

    pub fn user(&self, email: &str) -> Option<User> {
        self.accounts.lock().get(email).map(|a| a.user.clone())
    }

    // === Internals ===

    fn answer(&self, operation: &str) -> Option<Answer> {
        let mut answers = self.answers.lock();
        let queue = answers.get_mut(operation)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }

    fn account_for(&self, access_token: &str) -> Option<Account> {
        if self.expired.lock().contains(access_token) {
            return None;
        }
        let email = self.access_tokens.lock().get(access_token).cloned()?;
        self.accounts.lock().get(&email).cloned()
    }

    fn record_identity(&self, endpoint: &'static str, query: HashMap<String, String>, body: Value) {
        self.identity_calls.lock().push(IdentityCall {
            endpoint,
            query,
            body,
        });
    }

    fn verify_password(&self, email: &str, password: &str) -> Option<String> {
        self.accounts
            .lock()
            .get(email)
            .filter(|a| a.password == password)
            .map(|a| a.user.email.clone())
    }

    fn issue_session(&self, email: &str) -> Option<Value> {
        let user = self.user(email)?;
        let n = self.next_token.fetch_add(1, Ordering::SeqCst);
        let access_token = format!("access-{n}-{}", user.id.simple());
        let refresh_token = format!("refresh-{n}");

        self.access_tokens
            .lock()
            .insert(access_token.clone(), email.to_string());
        self.refresh_tokens
            .lock()
            .insert(refresh_token.clone(), email.to_string());

        Some(json!({
            "access_token": access_token,
            "refresh_token": refresh_token,
            "token_type": "bearer",
            "expires_in": TOKEN_TTL_SECS,
            "user": { "id": user.id, "email": user.email },
        }))
    }
}

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub backend: Arc<FakeBackend>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new fake backend
    pub async fn start() -> Result<Self> {
        let backend = Arc::new(FakeBackend::default());
        let app = create_app(backend.clone());

        // Bind to an ephemeral port
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            backend,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn graphql_url(&self) -> String {
        format!("{}/graphql", self.base_url())
    }

    pub fn identity_url(&self) -> String {
        format!("{}/auth/v1", self.base_url())
    }

    /// Client configuration pointing at this server
    pub fn config(&self) -> Result<AppConfig> {
        Ok(AppConfig::for_endpoints(
            &self.graphql_url(),
            &self.identity_url(),
            TEST_API_KEY,
        )?)
    }

    /// Fresh app shell wired to the real HTTP adapters
    pub fn shell(&self) -> Result<Arc<AppShell>> {
        Ok(Arc::new(AppShell::new(self.config()?)?))
    }

    /// Register `account` and sign it in through a fresh shell
    pub async fn signed_in(&self, account: &Account) -> Result<Arc<AppShell>> {
        self.backend.add_account(account);
        let shell = self.shell()?;
        shell.bootstrap("/login").await;
        shell
            .sign_in(&LoginForm {
                email: account.email().to_string(),
                password: account.password.clone(),
            })
            .await
            .map_err(|notice| anyhow!("Sign-in failed: {notice}"))?;
        Ok(shell)
    }
}

/// Poll `check` until it holds or five seconds pass
pub async fn eventually(what: &str, mut check: impl FnMut() -> bool) -> Result<()> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !check() {
        if tokio::time::Instant::now() >= deadline {
            anyhow::bail!("Timed out waiting for {what}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    Ok(())
}

/// Default profile for an account created through sign-up
fn signed_up_user(email: &str, body: &Value) -> User {
    let data = &body["data"];
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        first_name: data["first_name"].as_str().unwrap_or_default().to_string(),
        last_name: data["last_name"].as_str().unwrap_or_default().to_string(),
        role: AppRole::User,
        organization_id: None,
        is_banned: false,
        avatar_url: None,
        bio: None,
        created_at: chrono::Utc::now(),
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_app(backend: Arc<FakeBackend>) -> Router {
    Router::new()
        .route("/graphql", get(subscriptions).post(graphql))
        .route("/auth/v1/token", post(token))
        .route("/auth/v1/signup", post(signup))
        .route("/auth/v1/logout", post(logout))
        .route("/auth/v1/recover", post(recover))
        .route("/auth/v1/user", put(update_user))
        .with_state(backend)
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(ToString::to_string)
}

fn graphql_error(message: &str, code: Option<&str>) -> Response {
    Json(json!({
        "data": null,
        "errors": [{ "message": message, "extensions": { "code": code } }],
    }))
    .into_response()
}

fn identity_error(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn check_api_key(headers: &HeaderMap) -> Result<(), Response> {
    match headers.get("apikey").and_then(|v| v.to_str().ok()) {
        Some(TEST_API_KEY) => Ok(()),
        _ => Err(identity_error(
            StatusCode::UNAUTHORIZED,
            json!({ "message": "Invalid API key" }),
        )),
    }
}

// ============================================================================
// GraphQL over HTTP
// ============================================================================

async fn graphql(
    State(backend): State<Arc<FakeBackend>>,
    headers: HeaderMap,
    Json(request): Json<GraphqlRequest>,
) -> Response {
    let token = bearer(&headers);
    backend.requests.lock().push(RecordedRequest {
        operation: request.operation_name.clone(),
        variables: request.variables.clone(),
        token: token.clone(),
    });

    let Some(token) = token else {
        return (StatusCode::UNAUTHORIZED, "missing bearer token").into_response();
    };
    let Some(account) = backend.account_for(&token) else {
        return graphql_error("JWT expired", Some("UNAUTHENTICATED"));
    };
    if account.user.is_banned {
        return graphql_error("User is banned", Some("FORBIDDEN"));
    }

    match backend.answer(&request.operation_name) {
        Some(Answer::Data(data)) => Json(json!({ "data": data })).into_response(),
        Some(Answer::Error { message, code }) => graphql_error(&message, code.as_deref()),
        None if request.operation_name == "CurrentUser" => {
            Json(json!({ "data": { "me": account.user } })).into_response()
        }
        None => graphql_error(
            &format!("No answer scripted for {}", request.operation_name),
            None,
        ),
    }
}

// ============================================================================
// graphql-transport-ws
// ============================================================================

type Sink = SplitSink<WebSocket, Message>;

async fn subscriptions(
    State(backend): State<Arc<FakeBackend>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.protocols([SUBPROTOCOL])
        .on_upgrade(move |socket| serve_socket(backend, socket))
}

async fn send_frame(sink: &mut Sink, frame: Value) -> bool {
    sink.send(Message::Text(frame.to_string())).await.is_ok()
}

async fn close_socket(sink: &mut Sink, code: u16, reason: &str) {
    let _ = sink
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: Cow::Owned(reason.to_string()),
        })))
        .await;
}

async fn serve_socket(backend: Arc<FakeBackend>, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let mut pushes = backend.pushes.subscribe();
    // subscription id -> operation name
    let mut active: HashMap<String, String> = HashMap::new();
    let mut acknowledged = false;

    loop {
        tokio::select! {
            frame = stream.next() => {
                let text = match frame {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => continue,
                };
                let Ok(message) = ProtocolMessage::from_json(&text) else {
                    close_socket(&mut sink, 4400, "Invalid message").await;
                    break;
                };

                match message {
                    ProtocolMessage::ConnectionInit { payload } => {
                        backend.connection_inits.lock().push(payload.clone());
                        let rejected = *backend.reject_connections.lock();
                        if let Some(code) = rejected {
                            close_socket(&mut sink, code, "Forbidden").await;
                            break;
                        }
                        let authorized = payload
                            .as_ref()
                            .and_then(|p| p["Authorization"].as_str())
                            .and_then(|v| v.strip_prefix("Bearer "))
                            .is_some_and(|token| backend.account_for(token).is_some());
                        if !authorized {
                            close_socket(&mut sink, 4403, "Forbidden").await;
                            break;
                        }
                        acknowledged = true;
                        if !send_frame(&mut sink, json!({ "type": "connection_ack" })).await {
                            break;
                        }
                    }
                    ProtocolMessage::Subscribe { id, payload } => {
                        if !acknowledged {
                            close_socket(&mut sink, 4401, "Unauthorized").await;
                            break;
                        }
                        backend.subscriptions.lock().push(RecordedRequest {
                            operation: payload.operation_name.clone(),
                            variables: payload.variables,
                            token: None,
                        });
                        active.insert(id, payload.operation_name);
                    }
                    ProtocolMessage::Complete { id } => {
                        active.remove(&id);
                    }
                    ProtocolMessage::Ping { .. } => {
                        if !send_frame(&mut sink, json!({ "type": "pong" })).await {
                            break;
                        }
                    }
                    _ => {}
                }
            }
            push = pushes.recv() => match push {
                Ok(Push::Event { operation, data }) => {
                    for (id, _) in active.iter().filter(|(_, op)| **op == operation) {
                        let frame = json!({ "type": "next", "id": id, "payload": { "data": data } });
                        if !send_frame(&mut sink, frame).await {
                            return;
                        }
                    }
                }
                Ok(Push::Close { code, reason }) => {
                    close_socket(&mut sink, code, &reason).await;
                    break;
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

// ============================================================================
// Identity service
// ============================================================================

async fn token(
    State(backend): State<Arc<FakeBackend>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = check_api_key(&headers) {
        return rejection;
    }
    backend.record_identity("token", query.clone(), body.clone());

    let email = match query.get("grant_type").map(String::as_str) {
        Some("password") => backend.verify_password(
            body["email"].as_str().unwrap_or_default(),
            body["password"].as_str().unwrap_or_default(),
        ),
        Some("refresh_token") => backend
            .refresh_tokens
            .lock()
            .remove(body["refresh_token"].as_str().unwrap_or_default()),
        _ => None,
    };

    match email.and_then(|email| backend.issue_session(&email)) {
        Some(session) => Json(session).into_response(),
        None => identity_error(
            StatusCode::BAD_REQUEST,
            json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials",
            }),
        ),
    }
}

async fn signup(
    State(backend): State<Arc<FakeBackend>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = check_api_key(&headers) {
        return rejection;
    }
    backend.record_identity("signup", query, body.clone());

    let email = body["email"].as_str().unwrap_or_default().to_string();
    if backend.user(&email).is_some() {
        return identity_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "code": 422, "msg": "User already registered" }),
        );
    }
    let account = Account {
        password: body["password"].as_str().unwrap_or_default().to_string(),
        user: signed_up_user(&email, &body),
    };
    backend.add_account(&account);

    // Email confirmation is on: no session until the link is followed
    Json(json!({ "id": account.user.id, "email": email })).into_response()
}

async fn logout(State(backend): State<Arc<FakeBackend>>, headers: HeaderMap) -> Response {
    if let Err(rejection) = check_api_key(&headers) {
        return rejection;
    }
    backend.record_identity("logout", HashMap::new(), Value::Null);
    if let Some(token) = bearer(&headers) {
        backend.access_tokens.lock().remove(&token);
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn recover(
    State(backend): State<Arc<FakeBackend>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = check_api_key(&headers) {
        return rejection;
    }
    backend.record_identity("recover", query, body);
    Json(json!({})).into_response()
}

async fn update_user(
    State(backend): State<Arc<FakeBackend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = check_api_key(&headers) {
        return rejection;
    }
    backend.record_identity("user", HashMap::new(), body.clone());

    let Some(account) = bearer(&headers).and_then(|token| backend.account_for(&token)) else {
        return identity_error(StatusCode::UNAUTHORIZED, json!({ "msg": "invalid JWT" }));
    };
    if let Some(password) = body["password"].as_str() {
        if let Some(stored) = backend.accounts.lock().get_mut(account.email()) {
            stored.password = password.to_string();
        }
    }
    Json(json!({ "id": account.id(), "email": account.email() })).into_response()
}
