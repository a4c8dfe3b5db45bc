//! `graphql-transport-ws` protocol definitions

mod close_codes;
mod messages;

pub use close_codes::{CloseCode, Recovery};
pub use messages::{ProtocolMessage, SUBPROTOCOL};
