//! Chat screen of one pairing: message rows, draft box and typing line

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use pairing_client::forms::MessageForm;
use pairing_client::{check, ClientError, GraphqlClient};
use pairing_core::ChatMessage;
use pairing_realtime::{ChatRoom, ChatUpdate, RealtimeResult, SubscriptionClient};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::notice::Notice;

/// One message bubble
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub id: Uuid,
    pub content: String,
    pub mine: bool,
    pub sent_at: DateTime<Utc>,
    /// Shown under own messages once the partner has read them
    pub seen: bool,
}

pub struct ChatScreen {
    room: ChatRoom,
    me: Uuid,
    partner_name: String,
    draft: String,
}

impl ChatScreen {
    pub async fn open(
        client: Arc<GraphqlClient>,
        realtime: &SubscriptionClient,
        pairing_id: Uuid,
        partner_name: impl Into<String>,
        typing_idle: Duration,
    ) -> RealtimeResult<Self> {
        let me = client.session().user_id().ok_or(ClientError::NotSignedIn)?;
        let room = ChatRoom::open_with_idle(client, realtime, pairing_id, me, typing_idle).await?;
        Ok(Self {
            room,
            me,
            partner_name: partner_name.into(),
            draft: String::new(),
        })
    }

    pub fn pairing_id(&self) -> Uuid {
        self.room.pairing_id()
    }

    pub fn updates(&self) -> broadcast::Receiver<ChatUpdate> {
        self.room.subscribe()
    }

    pub fn rows(&self) -> Vec<MessageRow> {
        rows(&self.room.messages(), self.me)
    }

    pub fn unread_count(&self) -> usize {
        self.room.unread_count()
    }

    pub fn typing_line(&self) -> Option<String> {
        typing_line(&self.partner_name, self.room.is_partner_typing())
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Edit the draft; every change counts as a keystroke
    pub async fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
        if !self.draft.trim().is_empty() {
            self.room.keystroke().await;
        }
    }

    /// Send the draft. A blank draft is a no-op; the draft is kept when sending fails.
    pub async fn submit(&mut self) -> Result<Option<ChatMessage>, Notice> {
        if self.draft.trim().is_empty() {
            return Ok(None);
        }
        let form = MessageForm {
            content: self.draft.clone(),
        };
        check(&form).map_err(Notice::invalid)?;

        match self.room.send(&form.content).await {
            Ok(message) => {
                self.draft.clear();
                Ok(Some(message))
            }
            Err(err) => Err(Notice::from_realtime(&err)),
        }
    }

    pub async fn close(self) {
        self.room.close().await;
    }
}

pub fn rows(messages: &[ChatMessage], me: Uuid) -> Vec<MessageRow> {
    messages
        .iter()
        .map(|message| {
            let mine = message.is_from(me);
            MessageRow {
                id: message.id,
                content: message.content.clone(),
                mine,
                sent_at: message.created_at,
                seen: mine && message.is_read,
            }
        })
        .collect()
}

pub fn typing_line(partner_name: &str, typing: bool) -> Option<String> {
    typing.then(|| format!("{partner_name} is typing..."))
}
