//! `graphql-transport-ws` message format
//!
//! Every frame is a JSON object tagged by `type`.

use pairing_client::graphql::{GraphqlErrorBody, GraphqlRequest, GraphqlResponse};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// WebSocket subprotocol negotiated on connect
pub const SUBPROTOCOL: &str = "graphql-transport-ws";

/// One protocol frame
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProtocolMessage {
    ConnectionInit {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    ConnectionAck {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Ping {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Pong {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    Subscribe {
        id: String,
        payload: GraphqlRequest,
    },
    Next {
        id: String,
        payload: GraphqlResponse,
    },
    Error {
        id: String,
        payload: Vec<GraphqlErrorBody>,
    },
    Complete {
        id: String,
    },
}

impl ProtocolMessage {
    // === Client Messages ===

    /// `connection_init` carrying the bearer token, if any
    #[must_use]
    pub fn connection_init(access_token: Option<&str>) -> Self {
        Self::ConnectionInit {
            payload: access_token.map(|token| json!({ "Authorization": format!("Bearer {token}") })),
        }
    }

    #[must_use]
    pub fn subscribe(id: impl Into<String>, request: GraphqlRequest) -> Self {
        Self::Subscribe {
            id: id.into(),
            payload: request,
        }
    }

    #[must_use]
    pub fn complete(id: impl Into<String>) -> Self {
        Self::Complete { id: id.into() }
    }

    #[must_use]
    pub fn pong() -> Self {
        Self::Pong { payload: None }
    }

    // === Utilities ===

    /// Protocol name of the frame
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionInit { .. } => "connection_init",
            Self::ConnectionAck { .. } => "connection_ack",
            Self::Ping { .. } => "ping",
            Self::Pong { .. } => "pong",
            Self::Subscribe { .. } => "subscribe",
            Self::Next { .. } => "next",
            Self::Error { .. } => "error",
            Self::Complete { .. } => "complete",
        }
    }

    /// Subscription id for the frames that carry one
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Subscribe { id, .. }
            | Self::Next { id, .. }
            | Self::Error { id, .. }
            | Self::Complete { id } => Some(id),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for ProtocolMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.id() {
            Some(id) => write!(f, "ProtocolMessage({}, id={id})", self.kind()),
            None => write!(f, "ProtocolMessage({})", self.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_init_carries_bearer() {
        let json = ProtocolMessage::connection_init(Some("abc")).to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "connection_init");
        assert_eq!(value["payload"]["Authorization"], "Bearer abc");

        let anonymous = ProtocolMessage::connection_init(None).to_json().unwrap();
        assert_eq!(anonymous, r#"{"type":"connection_init"}"#);
    }

    #[test]
    fn test_parse_server_frames() {
        let ack = ProtocolMessage::from_json(r#"{"type":"connection_ack"}"#).unwrap();
        assert!(matches!(ack, ProtocolMessage::ConnectionAck { payload: None }));

        let next = ProtocolMessage::from_json(
            r#"{"type":"next","id":"3","payload":{"data":{"typingStatus":null}}}"#,
        )
        .unwrap();
        assert_eq!(next.id(), Some("3"));
        match next {
            ProtocolMessage::Next { payload, .. } => assert!(payload.data.is_some()),
            other => panic!("unexpected {other}"),
        }

        let error = ProtocolMessage::from_json(
            r#"{"type":"error","id":"4","payload":[{"message":"Not a participant","extensions":{"code":"FORBIDDEN"}}]}"#,
        )
        .unwrap();
        match error {
            ProtocolMessage::Error { payload, .. } => {
                assert_eq!(payload[0].code(), Some("FORBIDDEN"));
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(ProtocolMessage::from_json(r#"{"type":"start","id":"1"}"#).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ProtocolMessage::complete("7").to_string(),
            "ProtocolMessage(complete, id=7)"
        );
        assert_eq!(ProtocolMessage::pong().to_string(), "ProtocolMessage(pong)");
    }
}
