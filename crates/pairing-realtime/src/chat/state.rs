//! Local chat state of one pairing

use std::time::{Duration, Instant};

use pairing_core::{ChatEvent, ChatMessage, LogChange, MessageLog, TypingIndicator};
use uuid::Uuid;

use crate::protocol::Recovery;

/// What a view should do after an event was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatUpdate {
    /// A message landed at the tail of the log
    ScrollToBottom(Uuid),
    /// A message was placed earlier in the log or corrected in place
    Updated(Uuid),
    /// Partner typing indicator turned on or off
    TypingChanged(bool),
    /// The partner read our messages; count of messages flipped
    ReadReceipts(usize),
    /// Nothing visible changed
    Ignored,
    /// The subscription connection ended, with what to do about it
    Disconnected(Recovery),
}

/// Message log plus partner typing indicator, as seen by `me`
#[derive(Debug, Clone)]
pub struct ChatState {
    pairing_id: Uuid,
    me: Uuid,
    log: MessageLog,
    typing: TypingIndicator,
}

impl ChatState {
    pub fn new(pairing_id: Uuid, me: Uuid, typing_idle: Duration) -> Self {
        Self {
            pairing_id,
            me,
            log: MessageLog::new(),
            typing: TypingIndicator::new(typing_idle),
        }
    }

    /// Seed the log from the message history query
    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.log = MessageLog::from_messages(history);
        self
    }

    pub fn apply(&mut self, event: ChatEvent, now: Instant) -> ChatUpdate {
        if event.pairing_id() != self.pairing_id {
            return ChatUpdate::Ignored;
        }

        match event {
            ChatEvent::MessageSent(message) => {
                let from_partner = !message.is_from(self.me);
                let update = self.apply_message(message);
                // A message from the partner ends their typing
                if from_partner && update != ChatUpdate::Ignored {
                    self.typing.observe(false, now);
                }
                update
            }
            ChatEvent::Typing(status) => {
                if status.user_id == self.me {
                    return ChatUpdate::Ignored;
                }
                if self.typing.observe(status.is_typing, now) {
                    ChatUpdate::TypingChanged(status.is_typing)
                } else {
                    ChatUpdate::Ignored
                }
            }
            ChatEvent::MessagesRead(receipt) => {
                if receipt.reader_id == self.me {
                    return ChatUpdate::Ignored;
                }
                match self.log.mark_read_by_partner(self.me) {
                    0 => ChatUpdate::Ignored,
                    flipped => ChatUpdate::ReadReceipts(flipped),
                }
            }
        }
    }

    /// Reconcile one message, e.g. the result of our own send
    pub fn apply_message(&mut self, message: ChatMessage) -> ChatUpdate {
        let id = message.id;
        match self.log.apply_new(message) {
            LogChange::Appended => ChatUpdate::ScrollToBottom(id),
            LogChange::Inserted | LogChange::Replaced => ChatUpdate::Updated(id),
            LogChange::Duplicate => ChatUpdate::Ignored,
        }
    }

    /// Turn the typing indicator off once its idle window passed
    pub fn expire_typing(&mut self, now: Instant) -> Option<ChatUpdate> {
        self.typing
            .expire(now)
            .then_some(ChatUpdate::TypingChanged(false))
    }

    /// Mark incoming messages read locally; returns how many changed
    pub fn mark_incoming_read(&mut self) -> usize {
        self.log.mark_incoming_read(self.me)
    }

    pub fn pairing_id(&self) -> Uuid {
        self.pairing_id
    }

    pub fn me(&self) -> Uuid {
        self.me
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.log.to_vec()
    }

    pub fn unread_count(&self) -> usize {
        self.log.unread_from_partner(self.me)
    }

    pub fn is_partner_typing(&self, now: Instant) -> bool {
        self.typing.is_active(now)
    }

    pub fn typing_deadline(&self) -> Option<Instant> {
        self.typing.expires_at()
    }
}
