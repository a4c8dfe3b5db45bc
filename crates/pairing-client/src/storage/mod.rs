//! Browser-session storage: slots and the flows built on them

pub mod keys;
mod calendar_oauth;
mod memory;
mod rating_prompts;

pub use calendar_oauth::{CalendarOAuthHandoff, CalendarOAuthOutcome, GOOGLE_CALENDAR_SCOPE};
pub use memory::MemorySessionStorage;
pub use rating_prompts::RatingPromptTracker;
