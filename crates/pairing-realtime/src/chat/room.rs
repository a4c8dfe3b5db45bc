//! Chat room: history query, send mutation and the three chat subscriptions
//! composed into one live `ChatState`.

use std::sync::Arc;
use std::time::Duration;

use pairing_client::operations::{
    MarkMessagesRead, OnMessageSent, OnMessagesRead, OnTyping, PairingIdVariables,
    PairingMessages, SendMessage, SendMessageVariables,
};
use pairing_client::GraphqlClient;
use pairing_core::{ChatEvent, ChatMessage, DEFAULT_TYPING_IDLE};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::state::{ChatState, ChatUpdate};
use super::typing::{GraphqlTypingSink, TypingNotifier};
use crate::connection::{SubscriptionClient, SubscriptionStream};
use crate::error::RealtimeResult;
use crate::protocol::Recovery;

const UPDATE_CAPACITY: usize = 64;
const EVENT_CAPACITY: usize = 64;

type EventFeed = mpsc::Receiver<RealtimeResult<ChatEvent>>;

/// Live chat of one pairing
pub struct ChatRoom {
    client: Arc<GraphqlClient>,
    pairing_id: Uuid,
    state: Arc<Mutex<ChatState>>,
    updates: broadcast::Sender<ChatUpdate>,
    notifier: TypingNotifier,
    tasks: Vec<JoinHandle<()>>,
}

impl ChatRoom {
    /// Open with the default 2 s typing idle window
    pub async fn open(
        client: Arc<GraphqlClient>,
        realtime: &SubscriptionClient,
        pairing_id: Uuid,
        me: Uuid,
    ) -> RealtimeResult<Self> {
        Self::open_with_idle(client, realtime, pairing_id, me, DEFAULT_TYPING_IDLE).await
    }

    /// Subscribe first, then load history, so nothing sent in between is lost
    #[instrument(skip(client, realtime, typing_idle), fields(pairing_id = %pairing_id))]
    pub async fn open_with_idle(
        client: Arc<GraphqlClient>,
        realtime: &SubscriptionClient,
        pairing_id: Uuid,
        me: Uuid,
        typing_idle: Duration,
    ) -> RealtimeResult<Self> {
        let vars = PairingIdVariables { pairing_id };
        let (events_tx, events) = mpsc::channel(EVENT_CAPACITY);
        let mut tasks = vec![
            forward(realtime.subscribe::<OnMessageSent>(&vars)?, events_tx.clone(), |d| {
                ChatEvent::MessageSent(d.message_sent)
            }),
            forward(realtime.subscribe::<OnTyping>(&vars)?, events_tx.clone(), |d| {
                ChatEvent::Typing(d.typing_status)
            }),
            forward(realtime.subscribe::<OnMessagesRead>(&vars)?, events_tx, |d| {
                ChatEvent::MessagesRead(d.messages_read)
            }),
        ];

        let history = match client.refetch::<PairingMessages>(&vars).await {
            Ok(data) => data.pairing_messages,
            Err(err) => {
                tasks.iter().for_each(JoinHandle::abort);
                return Err(err.into());
            }
        };
        let mut state = ChatState::new(pairing_id, me, typing_idle).with_history(history);
        if state.unread_count() > 0 {
            mark_read(&client, pairing_id).await;
            state.mark_incoming_read();
        }
        info!(messages = state.log().len(), "Chat opened");

        let state = Arc::new(Mutex::new(state));
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        tasks.push(tokio::spawn(pump(
            events,
            state.clone(),
            updates.clone(),
            client.clone(),
        )));

        let sink = Arc::new(GraphqlTypingSink::new(client.clone(), pairing_id));
        Ok(Self {
            client,
            pairing_id,
            state,
            updates,
            notifier: TypingNotifier::new(sink, typing_idle),
            tasks,
        })
    }

    pub fn pairing_id(&self) -> Uuid {
        self.pairing_id
    }

    /// Updates for the view, in the order they were applied
    pub fn subscribe(&self) -> broadcast::Receiver<ChatUpdate> {
        self.updates.subscribe()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state.lock().messages()
    }

    pub fn unread_count(&self) -> usize {
        self.state.lock().unread_count()
    }

    pub fn is_partner_typing(&self) -> bool {
        self.state.lock().is_partner_typing(Instant::now().into_std())
    }

    /// Forward a keystroke to the typing notifier
    pub async fn keystroke(&self) {
        self.notifier.keystroke().await;
    }

    /// Send a message; whitespace-only content never reaches the server
    #[instrument(skip_all, fields(pairing_id = %self.pairing_id))]
    pub async fn send(&self, content: &str) -> RealtimeResult<ChatMessage> {
        let content = ChatMessage::prepare_content(content)?;
        self.notifier.stop().await;

        let data = self
            .client
            .mutate::<SendMessage>(&SendMessageVariables {
                pairing_id: self.pairing_id,
                content,
            })
            .await?;
        let message = data.send_message;

        let update = self.state.lock().apply_message(message.clone());
        if update != ChatUpdate::Ignored {
            let _ = self.updates.send(update);
        }
        debug!(message_id = %message.id, "Message sent");
        Ok(message)
    }

    /// Stop listening and typing; the subscriptions complete as their streams drop
    pub async fn close(&self) {
        self.notifier.stop().await;
        self.tasks.iter().for_each(JoinHandle::abort);
    }
}

impl Drop for ChatRoom {
    fn drop(&mut self) {
        self.tasks.iter().for_each(JoinHandle::abort);
    }
}

fn forward<T, F>(
    mut stream: SubscriptionStream<T>,
    events: mpsc::Sender<RealtimeResult<ChatEvent>>,
    into_event: F,
) -> JoinHandle<()>
where
    T: DeserializeOwned + Send + 'static,
    F: Fn(T) -> ChatEvent + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(item) = stream.recv().await {
            if events.send(item.map(&into_event)).await.is_err() {
                break;
            }
        }
    })
}

async fn pump(
    mut events: EventFeed,
    state: Arc<Mutex<ChatState>>,
    updates: broadcast::Sender<ChatUpdate>,
    client: Arc<GraphqlClient>,
) {
    let (pairing_id, me) = {
        let state = state.lock();
        (state.pairing_id(), state.me())
    };

    let recovery = loop {
        let deadline = state.lock().typing_deadline();
        tokio::select! {
            item = events.recv() => match item {
                Some(Ok(event)) => {
                    let incoming = matches!(
                        &event,
                        ChatEvent::MessageSent(message) if !message.is_from(me)
                    );
                    let update = state.lock().apply(event, Instant::now().into_std());
                    // The room is open, so the partner's new message counts as read
                    if incoming && update != ChatUpdate::Ignored {
                        mark_read(&client, pairing_id).await;
                        state.lock().mark_incoming_read();
                    }
                    if update != ChatUpdate::Ignored {
                        let _ = updates.send(update);
                    }
                }
                Some(Err(err)) if err.is_connection_closed() => {
                    warn!(error = %err, "Chat subscription closed");
                    break err.recovery();
                }
                Some(Err(err)) => warn!(error = %err, "Chat subscription error"),
                None => break Recovery::GiveUp,
            },
            () = wait_until(deadline) => {
                let expired = state.lock().expire_typing(Instant::now().into_std());
                if let Some(update) = expired {
                    let _ = updates.send(update);
                }
            }
        }
    };
    let _ = updates.send(ChatUpdate::Disconnected(recovery));
}

async fn wait_until(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

async fn mark_read(client: &GraphqlClient, pairing_id: Uuid) {
    if let Err(err) = client
        .mutate::<MarkMessagesRead>(&PairingIdVariables { pairing_id })
        .await
    {
        warn!(error = %err, "Failed to mark messages read");
    }
}
