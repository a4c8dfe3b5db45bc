//! Realtime error types

use pairing_client::ClientError;
use pairing_common::AppError;
use pairing_core::DomainError;
use tokio_tungstenite::tungstenite;

use crate::protocol::{CloseCode, Recovery};

#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    /// WebSocket handshake or I/O failure
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Server did not acknowledge `connection_init` in time
    #[error("Connection was not acknowledged")]
    AckTimeout,

    /// Socket closed, with the close code when the server sent one
    #[error("Connection closed ({code:?}): {reason}")]
    ConnectionClosed { code: Option<u16>, reason: String },

    /// Frame outside the protocol
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Server rejected the operation
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RealtimeError {
    /// Known protocol close code, if the socket was closed with one
    pub fn close_code(&self) -> Option<CloseCode> {
        match self {
            Self::ConnectionClosed { code: Some(code), .. } => CloseCode::from_u16(*code),
            _ => None,
        }
    }

    pub fn is_connection_closed(&self) -> bool {
        matches!(self, Self::ConnectionClosed { .. } | Self::WebSocket(_))
    }

    /// Next step after this error; a drop without a protocol code is worth a retry
    pub fn recovery(&self) -> Recovery {
        match self.close_code() {
            Some(code) => code.recovery(),
            None if self.is_connection_closed() || matches!(self, Self::AckTimeout) => {
                Recovery::Reconnect
            }
            None => match self {
                Self::Client(err) if err.is_unauthenticated() => Recovery::Reauthenticate,
                _ => Recovery::GiveUp,
            },
        }
    }

    /// Text for toasts and inline banners
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(err) => err.user_message(),
            Self::Domain(err) => err.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<tungstenite::Error> for RealtimeError {
    fn from(err: tungstenite::Error) -> Self {
        match err {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                Self::ConnectionClosed {
                    code: None,
                    reason: err.to_string(),
                }
            }
            other => Self::WebSocket(other.to_string()),
        }
    }
}

impl From<RealtimeError> for AppError {
    fn from(err: RealtimeError) -> Self {
        match err {
            RealtimeError::Client(inner) => inner.into(),
            RealtimeError::Domain(inner) => AppError::Domain(inner),
            other if other.recovery() == Recovery::Reauthenticate => AppError::SessionExpired,
            other => AppError::Network(other.to_string()),
        }
    }
}

pub type RealtimeResult<T> = Result<T, RealtimeError>;
