//! Screen models
//!
//! Each screen owns its view state and talks to the server through the shared
//! `GraphqlClient`. Actions return a `Notice` for the user instead of an error.

pub mod achievements;
pub mod algorithm;
pub mod auth;
pub mod calendar;
pub mod chat;
pub mod organizations;
pub mod pairings;
pub mod profile;
pub mod ratings;
pub mod reports;
pub mod statistics;
pub mod users;

pub use achievements::AchievementBoard;
pub use algorithm::AlgorithmScreen;
pub use auth::{AuthScreen, InviteCodeStatus};
pub use calendar::{CalendarScreen, GoogleSync, MeetingCard};
pub use chat::{ChatScreen, MessageRow};
pub use organizations::OrganizationsScreen;
pub use pairings::{PairingRow, PairingsScreen, PairingsTab};
pub use profile::ProfileScreen;
pub use ratings::{RatingsScreen, ReceivedRatings};
pub use reports::ReportsScreen;
pub use statistics::{StatCard, StatisticsScreen};
pub use users::UsersScreen;
