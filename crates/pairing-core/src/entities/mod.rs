//! Domain entities - client-side mirrors of the GraphQL schema types

mod achievement;
mod calendar;
mod chat_message;
mod meeting;
mod organization;
mod pairing;
mod rating;
mod report;
mod typing;
mod user;

pub use achievement::Achievement;
pub use calendar::{group_by_day, CalendarEvent, CalendarOccurrence, CalendarSource};
pub use chat_message::{ChatMessage, LogChange, MessageLog, MAX_MESSAGE_LENGTH};
pub use meeting::{MeetingBanner, MeetingEvent, MeetingProposal, MeetingStatus};
pub use organization::{Organization, OrganizationStatistics};
pub use pairing::{AlgorithmRunResult, Pairing, PairingAlgorithmSettings, PairingStatus};
pub use rating::Rating;
pub use report::{Report, ReportStatus};
pub use typing::{TypingIndicator, DEFAULT_TYPING_IDLE};
pub use user::User;
