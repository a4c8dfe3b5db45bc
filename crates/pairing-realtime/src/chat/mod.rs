//! Realtime chat composition

mod room;
mod state;
mod typing;

pub use room::ChatRoom;
pub use state::{ChatState, ChatUpdate};
pub use typing::{GraphqlTypingSink, TypingNotifier, TypingSink};
