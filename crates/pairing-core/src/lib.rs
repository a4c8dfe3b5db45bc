//! # pairing-core
//!
//! Domain layer for the pairing client: entities mirrored from the GraphQL schema,
//! value objects, realtime chat events and the pure rules that run on the client
//! (message reconciliation, meeting banner derivation, typing indicator).
//! This crate performs no I/O.

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    group_by_day, CalendarSource, DEFAULT_TYPING_IDLE, MAX_MESSAGE_LENGTH,
    Achievement, AlgorithmRunResult, CalendarEvent, CalendarOccurrence, ChatMessage, LogChange,
    MeetingBanner, MeetingEvent, MeetingProposal, MeetingStatus, MessageLog, Organization,
    OrganizationStatistics, Pairing, PairingAlgorithmSettings, PairingStatus, Rating, Report,
    ReportStatus, TypingIndicator, User,
};
pub use error::{DomainError, DomainResult};
pub use events::{ChatEvent, ReadReceipt, TypingStatus};
pub use traits::{read_json, write_json, SessionStorage};
pub use value_objects::{AppRole, RoleParseError, RoleSet, TimeRange};
