//! Client error types
//!
//! Every failure a screen can see: GraphQL errors classified by code,
//! transport failures, identity-provider rejections and local validation.

use pairing_common::{AppError, ConfigError};
use pairing_core::DomainError;

use crate::forms::FieldErrors;

/// GraphQL error code for a missing or expired session
pub const CODE_UNAUTHENTICATED: &str = "UNAUTHENTICATED";

/// GraphQL error code for a denied operation
pub const CODE_FORBIDDEN: &str = "FORBIDDEN";

/// Client layer error type
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Session missing, expired or rejected by the server
    #[error("{0}")]
    Unauthenticated(String),

    /// Operation denied for the current role
    #[error("{0}")]
    Forbidden(String),

    /// Account banned or suspended
    #[error("{0}")]
    Banned(String),

    /// Any other error returned in the GraphQL `errors` array
    #[error("{message}")]
    Graphql {
        message: String,
        code: Option<String>,
    },

    /// Non-success HTTP status without a GraphQL error body
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Request never completed
    #[error("Network error: {0}")]
    Network(String),

    /// Response could not be decoded into the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Wrong email or password
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// Rejected by the identity provider
    #[error("{message}")]
    Identity { status: u16, message: String },

    /// Operation requires a signed-in user
    #[error("Not signed in")]
    NotSignedIn,

    /// Form input rejected before submission
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Calendar authorization is not in progress")]
    NoCalendarHandoff,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ClientError {
    /// Classify one GraphQL error by its `extensions.code` and the HTTP status
    pub fn from_graphql(message: impl Into<String>, code: Option<&str>, http_status: u16) -> Self {
        let message = message.into();
        let code_upper = code.map(str::to_ascii_uppercase);

        if code_upper.as_deref() == Some(CODE_UNAUTHENTICATED) || http_status == 401 {
            Self::Unauthenticated(message)
        } else if code_upper.as_deref() == Some(CODE_FORBIDDEN) || http_status == 403 {
            if is_ban_message(&message) {
                Self::Banned(message)
            } else {
                Self::Forbidden(message)
            }
        } else {
            Self::Graphql {
                message,
                code: code.map(ToString::to_string),
            }
        }
    }

    /// Raw message shown in toasts and inline banners
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors.summary(),
            other => other.to_string(),
        }
    }

    #[inline]
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated(_))
    }

    #[inline]
    pub fn is_banned(&self) -> bool {
        matches!(self, Self::Banned(_))
    }

    #[inline]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_) | Self::Banned(_))
    }

    /// Stable error code for logs
    pub fn error_code(&self) -> &str {
        match self {
            Self::Unauthenticated(_) => CODE_UNAUTHENTICATED,
            Self::Forbidden(_) => CODE_FORBIDDEN,
            Self::Banned(_) => "ACCOUNT_BANNED",
            Self::Graphql { code, .. } => code.as_deref().unwrap_or("GRAPHQL_ERROR"),
            Self::Http { .. } => "HTTP_ERROR",
            Self::Network(_) => "NETWORK_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Identity { .. } => "IDENTITY_ERROR",
            Self::NotSignedIn => "NOT_SIGNED_IN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NoCalendarHandoff => "NO_CALENDAR_HANDOFF",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Domain(e) => e.code(),
        }
    }
}

/// `forbidden` errors whose message matches `/banned|suspended/i`
pub fn is_ban_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("banned") || lower.contains("suspended")
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<FieldErrors> for ClientError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthenticated(_) => AppError::SessionExpired,
            ClientError::Forbidden(msg) => AppError::Forbidden(msg),
            ClientError::Banned(msg) => AppError::AccountBanned(msg),
            ClientError::InvalidCredentials => AppError::InvalidCredentials,
            ClientError::NotSignedIn => AppError::NotSignedIn,
            ClientError::Validation(errors) => AppError::Validation(errors.summary()),
            ClientError::Network(msg) => AppError::Network(msg),
            ClientError::Graphql { message, code } => match code.as_deref() {
                Some("NOT_FOUND") => AppError::NotFound(message),
                Some("CONFLICT") => AppError::Conflict(message),
                Some("BAD_USER_INPUT") => AppError::Validation(message),
                _ => AppError::Server(message),
            },
            ClientError::Domain(e) => AppError::Domain(e),
            ClientError::Config(e) => AppError::Config(e.to_string()),
            other => AppError::Server(other.to_string()),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
