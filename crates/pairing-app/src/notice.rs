//! Toasts and inline banners
//!
//! Mutation failures show the raw server message. Validation failures stay
//! next to the form, with the per-field messages attached.

use std::fmt;

use pairing_client::{ClientError, FieldErrors};
use pairing_realtime::RealtimeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Transient popup
    Toast,
    /// Banner inside the form or screen
    Inline,
}

/// Feedback for a user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub placement: Placement,
    /// Field messages, for validation failures
    pub fields: Option<FieldErrors>,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            placement: Placement::Toast,
            fields: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    /// Show inside the screen instead of as a toast
    pub fn inline(mut self) -> Self {
        self.placement = Placement::Inline;
        self
    }

    /// Failed action; validation errors go inline, everything else is a toast
    pub fn from_error(err: &ClientError) -> Self {
        match err {
            ClientError::Validation(fields) => Self::invalid(fields.clone()),
            other => Self::error(other.user_message()),
        }
    }

    pub fn from_realtime(err: &RealtimeError) -> Self {
        match err {
            RealtimeError::Client(inner) => Self::from_error(inner),
            other => Self::error(other.user_message()),
        }
    }

    /// Form rejected before submission
    pub fn invalid(fields: FieldErrors) -> Self {
        Self {
            fields: Some(fields.clone()),
            ..Self::error(fields.summary()).inline()
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<ClientError> for Notice {
    fn from(err: ClientError) -> Self {
        Self::from_error(&err)
    }
}

impl From<FieldErrors> for Notice {
    fn from(fields: FieldErrors) -> Self {
        Self::invalid(fields)
    }
}
