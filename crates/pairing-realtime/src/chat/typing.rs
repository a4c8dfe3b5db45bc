//! Outgoing typing status

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pairing_client::operations::{SetTypingStatus, SetTypingStatusVariables};
use pairing_client::{ClientResult, GraphqlClient};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

/// Where typing status changes are sent
#[async_trait]
pub trait TypingSink: Send + Sync + 'static {
    async fn set_typing(&self, is_typing: bool) -> ClientResult<()>;
}

/// Sends typing status through the `SetTypingStatus` mutation
pub struct GraphqlTypingSink {
    client: Arc<GraphqlClient>,
    pairing_id: Uuid,
}

impl GraphqlTypingSink {
    pub fn new(client: Arc<GraphqlClient>, pairing_id: Uuid) -> Self {
        Self { client, pairing_id }
    }
}

#[async_trait]
impl TypingSink for GraphqlTypingSink {
    async fn set_typing(&self, is_typing: bool) -> ClientResult<()> {
        self.client
            .mutate::<SetTypingStatus>(&SetTypingStatusVariables {
                pairing_id: self.pairing_id,
                is_typing,
            })
            .await
            .map(|_| ())
    }
}

#[derive(Default)]
struct NotifierState {
    typing: bool,
    deadline: Option<Instant>,
    timer: Option<JoinHandle<()>>,
}

/// Reports our own typing: on at the first keystroke, off after `idle` without one
pub struct TypingNotifier {
    sink: Arc<dyn TypingSink>,
    idle: Duration,
    state: Arc<Mutex<NotifierState>>,
}

impl TypingNotifier {
    pub fn new(sink: Arc<dyn TypingSink>, idle: Duration) -> Self {
        Self {
            sink,
            idle,
            state: Arc::new(Mutex::new(NotifierState::default())),
        }
    }

    pub fn is_typing(&self) -> bool {
        self.state.lock().typing
    }

    /// Record a keystroke. Only the first one after idle reaches the sink.
    pub async fn keystroke(&self) {
        let started = {
            let mut state = self.state.lock();
            state.deadline = Some(Instant::now() + self.idle);
            if state.timer.is_none() {
                state.timer = Some(tokio::spawn(run_timer(
                    self.state.clone(),
                    self.sink.clone(),
                )));
            }
            !std::mem::replace(&mut state.typing, true)
        };

        if started {
            debug!("Typing started");
            if let Err(err) = self.sink.set_typing(true).await {
                warn!(error = %err, "Failed to send typing status");
            }
        }
    }

    /// Stop typing now, e.g. when the message is sent
    pub async fn stop(&self) {
        let was_typing = {
            let mut state = self.state.lock();
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
            state.deadline = None;
            std::mem::replace(&mut state.typing, false)
        };

        if was_typing {
            send_stopped(self.sink.as_ref()).await;
        }
    }
}

impl Drop for TypingNotifier {
    fn drop(&mut self) {
        if let Some(timer) = self.state.lock().timer.take() {
            timer.abort();
        }
    }
}

async fn run_timer(state: Arc<Mutex<NotifierState>>, sink: Arc<dyn TypingSink>) {
    loop {
        let Some(deadline) = state.lock().deadline else {
            return;
        };
        tokio::time::sleep_until(deadline).await;

        {
            let mut state = state.lock();
            // Extended by a later keystroke
            if state.deadline.is_some_and(|current| current > Instant::now()) {
                continue;
            }
            state.typing = false;
            state.deadline = None;
            state.timer = None;
        }

        send_stopped(sink.as_ref()).await;
        return;
    }
}

async fn send_stopped(sink: &dyn TypingSink) {
    debug!("Typing stopped");
    if let Err(err) = sink.set_typing(false).await {
        warn!(error = %err, "Failed to send typing status");
    }
}
