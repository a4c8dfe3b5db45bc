//! Value objects - immutable types that represent domain concepts

mod role;
mod time_range;

pub use role::{AppRole, RoleParseError, RoleSet};
pub use time_range::TimeRange;
