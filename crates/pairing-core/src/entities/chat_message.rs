//! Chat message entity and the local message log of a pairing chat
//!
//! The log is ordered by the server-assigned `(created_at, id)` key and indexed
//! by message id, so events arriving twice or out of order from the
//! subscription and the send mutation converge on one entry per message.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Maximum accepted message length in characters
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Chat message between the two users of a pairing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub pairing_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Trim outgoing content and reject blank or oversized messages
    pub fn prepare_content(raw: &str) -> DomainResult<String> {
        let content = raw.trim();
        if content.is_empty() {
            return Err(DomainError::EmptyMessage);
        }
        if content.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(DomainError::ContentTooLong {
                max: MAX_MESSAGE_LENGTH,
            });
        }
        Ok(content.to_string())
    }

    #[inline]
    pub fn is_from(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id
    }
}

/// What applying a message did to the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogChange {
    /// New message placed after every existing one
    Appended,
    /// New message placed before the tail (arrived out of order)
    Inserted,
    /// Known id whose content or timestamp changed
    Replaced,
    /// Known id, nothing new
    Duplicate,
}

impl LogChange {
    /// Whether the log gained an entry
    #[inline]
    pub fn is_new(self) -> bool {
        matches!(self, Self::Appended | Self::Inserted)
    }
}

type LogKey = (DateTime<Utc>, Uuid);

/// Ordered, de-duplicated messages of one chat
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    ordered: BTreeMap<LogKey, ChatMessage>,
    index: HashMap<Uuid, DateTime<Utc>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from the authoritative query result
    pub fn from_messages(messages: impl IntoIterator<Item = ChatMessage>) -> Self {
        let mut log = Self::new();
        for message in messages {
            log.apply_new(message);
        }
        log
    }

    /// Reconcile one message into the log
    pub fn apply_new(&mut self, message: ChatMessage) -> LogChange {
        if let Some(known_at) = self.index.get(&message.id).copied() {
            let key = (known_at, message.id);
            if let Some(existing) = self.ordered.get_mut(&key) {
                let is_read = existing.is_read || message.is_read;
                if existing.content == message.content && existing.created_at == message.created_at
                {
                    existing.is_read = is_read;
                    return LogChange::Duplicate;
                }

                self.ordered.remove(&key);
                self.index.insert(message.id, message.created_at);
                self.ordered.insert(
                    (message.created_at, message.id),
                    ChatMessage { is_read, ..message },
                );
                return LogChange::Replaced;
            }
        }

        let key = (message.created_at, message.id);
        let at_tail = self
            .ordered
            .last_key_value()
            .map_or(true, |(last, _)| key > *last);

        self.index.insert(message.id, message.created_at);
        self.ordered.insert(key, message);

        if at_tail {
            LogChange::Appended
        } else {
            LogChange::Inserted
        }
    }

    /// Blanket read receipt: the partner has read everything `me` sent.
    ///
    /// Returns how many messages flipped to read.
    pub fn mark_read_by_partner(&mut self, me: Uuid) -> usize {
        let mut flipped = 0;
        for message in self.ordered.values_mut() {
            if message.sender_id == me && !message.is_read {
                message.is_read = true;
                flipped += 1;
            }
        }
        flipped
    }

    /// Mark every message received by `me` as read locally
    pub fn mark_incoming_read(&mut self, me: Uuid) -> usize {
        let mut flipped = 0;
        for message in self.ordered.values_mut() {
            if message.sender_id != me && !message.is_read {
                message.is_read = true;
                flipped += 1;
            }
        }
        flipped
    }

    /// Messages from the partner that `me` has not read
    pub fn unread_from_partner(&self, me: Uuid) -> usize {
        self.ordered
            .values()
            .filter(|m| m.sender_id != me && !m.is_read)
            .count()
    }

    pub fn get(&self, id: Uuid) -> Option<&ChatMessage> {
        let created_at = self.index.get(&id)?;
        self.ordered.get(&(*created_at, id))
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.ordered.values().next_back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ChatMessage> {
        self.ordered.values()
    }

    /// Owned copy in display order
    pub fn to_vec(&self) -> Vec<ChatMessage> {
        self.ordered.values().cloned().collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
