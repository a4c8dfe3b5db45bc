//! Chat events - one variant per chat subscription
//!
//! These events feed the local chat state:
//! - `messageSent` appends to the message log
//! - `typingStatus` drives the partner typing indicator
//! - `messagesRead` flips read receipts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::ChatMessage;

/// Typing state broadcast by one participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingStatus {
    pub pairing_id: Uuid,
    pub user_id: Uuid,
    pub is_typing: bool,
}

/// Notification that a participant has read the chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceipt {
    pub pairing_id: Uuid,
    pub reader_id: Uuid,
    pub read_at: DateTime<Utc>,
}

/// All chat events a pairing chat listens to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    MessageSent(ChatMessage),
    Typing(TypingStatus),
    MessagesRead(ReadReceipt),
}

impl ChatEvent {
    /// Pairing the event belongs to
    pub fn pairing_id(&self) -> Uuid {
        match self {
            Self::MessageSent(message) => message.pairing_id,
            Self::Typing(status) => status.pairing_id,
            Self::MessagesRead(receipt) => receipt.pairing_id,
        }
    }

    /// User that caused the event
    pub fn actor_id(&self) -> Uuid {
        match self {
            Self::MessageSent(message) => message.sender_id,
            Self::Typing(status) => status.user_id,
            Self::MessagesRead(receipt) => receipt.reader_id,
        }
    }

    /// Event name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::MessageSent(_) => "messageSent",
            Self::Typing(_) => "typingStatus",
            Self::MessagesRead(_) => "messagesRead",
        }
    }
}
