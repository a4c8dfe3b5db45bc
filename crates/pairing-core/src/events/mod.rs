//! Realtime events delivered by GraphQL subscriptions

mod chat_event;

pub use chat_event::{ChatEvent, ReadReceipt, TypingStatus};
