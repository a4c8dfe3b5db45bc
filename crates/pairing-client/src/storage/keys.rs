//! Session-storage slot names

/// Google Calendar token kept after the calendar OAuth round-trip
pub const GOOGLE_CALENDAR_ACCESS_TOKEN: &str = "google_calendar_access_token";

/// App session to put back once the calendar OAuth sign-in returns
pub const CALENDAR_OAUTH_RESTORE_SESSION: &str = "calendar_oauth_restore_session";

pub const CALENDAR_OAUTH_IN_PROGRESS: &str = "calendar_oauth_in_progress";

/// In-app path to return to after the calendar OAuth round-trip
pub const CALENDAR_OAUTH_REDIRECT: &str = "calendar_oauth_redirect";

/// Meetings that already showed the rating prompt in this browser session
pub const RATING_PROMPTED_MEETINGS: &str = "rating_prompted_meetings";

/// Identity session of the signed-in user, restored on the next start
pub const AUTH_SESSION: &str = "auth_session";
