//! WebSocket close codes
//!
//! Close codes defined by the `graphql-transport-ws` protocol.

use serde::{Deserialize, Serialize};

/// `graphql-transport-ws` close codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Malformed or unexpected message
    BadRequest = 4400,
    /// Subscribe sent before the connection was acknowledged
    Unauthorized = 4401,
    /// Connection init rejected by the server
    Forbidden = 4403,
    /// No `connection_init` within the server's timeout
    ConnectionInitTimeout = 4408,
    /// Subscription id already in use
    SubscriberAlreadyExists = 4409,
    /// `connection_init` sent twice
    TooManyInitialisationRequests = 4429,
    /// Server failure
    InternalServerError = 4500,
}

impl CloseCode {
    /// Create a `CloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            4400 => Some(Self::BadRequest),
            4401 => Some(Self::Unauthorized),
            4403 => Some(Self::Forbidden),
            4408 => Some(Self::ConnectionInitTimeout),
            4409 => Some(Self::SubscriberAlreadyExists),
            4429 => Some(Self::TooManyInitialisationRequests),
            4500 => Some(Self::InternalServerError),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Whether reconnecting with the same credentials can succeed
    #[must_use]
    pub const fn should_reconnect(self) -> bool {
        matches!(
            self,
            Self::ConnectionInitTimeout | Self::InternalServerError
        )
    }

    /// Whether the session token must be refreshed before reconnecting
    #[must_use]
    pub const fn requires_reauth(self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden)
    }

    /// Next step for a client whose socket was closed with this code
    #[must_use]
    pub const fn recovery(self) -> Recovery {
        if self.requires_reauth() {
            Recovery::Reauthenticate
        } else if self.should_reconnect() {
            Recovery::Reconnect
        } else {
            Recovery::GiveUp
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::BadRequest => "Invalid message received",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::ConnectionInitTimeout => "Connection initialisation timeout",
            Self::SubscriberAlreadyExists => "Subscriber already exists",
            Self::TooManyInitialisationRequests => "Too many initialisation requests",
            Self::InternalServerError => "Internal server error",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BadRequest => "BadRequest",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::ConnectionInitTimeout => "ConnectionInitTimeout",
            Self::SubscriberAlreadyExists => "SubscriberAlreadyExists",
            Self::TooManyInitialisationRequests => "TooManyInitialisationRequests",
            Self::InternalServerError => "InternalServerError",
        }
    }
}

/// What a client should do after losing the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Open a new connection with the same session
    Reconnect,
    /// Refresh or re-enter credentials before reconnecting
    Reauthenticate,
    /// Retrying will not help
    GiveUp,
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.as_u16(), self.description())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}
