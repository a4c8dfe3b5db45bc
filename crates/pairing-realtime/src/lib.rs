//! # pairing-realtime
//!
//! GraphQL subscriptions over the `graphql-transport-ws` protocol and the
//! realtime chat built on them: message log reconciliation, partner typing
//! indicator, read receipts and our own outgoing typing status.

pub mod chat;
pub mod connection;
pub mod error;
pub mod protocol;

// Re-export commonly used types at crate root
pub use chat::{ChatRoom, ChatState, ChatUpdate, TypingNotifier, TypingSink};
pub use connection::{SubscriptionClient, SubscriptionStream};
pub use error::{RealtimeError, RealtimeResult};
pub use protocol::{CloseCode, ProtocolMessage, Recovery};
