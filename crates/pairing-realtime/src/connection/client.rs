//! Subscription client
//!
//! One WebSocket per client. A writer task drains an mpsc queue into the
//! socket; a reader task answers pings and routes `next`/`error`/`complete`
//! frames to the subscription they belong to.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use pairing_client::graphql::{GraphqlRequest, Operation, OperationKind};
use pairing_client::{ClientError, SessionContext};
use pairing_common::GraphqlConfig;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{Routes, SubscriptionStream};
use crate::error::{RealtimeError, RealtimeResult};
use crate::protocol::{ProtocolMessage, SUBPROTOCOL};

/// How long to wait for `connection_ack`
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(10);

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Multiplexes GraphQL subscriptions over one `graphql-transport-ws` socket
pub struct SubscriptionClient {
    outgoing: mpsc::UnboundedSender<Message>,
    routes: Routes,
    next_id: AtomicU64,
    closed: Arc<AtomicBool>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl SubscriptionClient {
    /// Connect and complete the `connection_init` handshake
    pub async fn connect(url: &Url, access_token: Option<&str>) -> RealtimeResult<Self> {
        Self::connect_with_timeout(url, access_token, DEFAULT_ACK_TIMEOUT).await
    }

    /// Connect to the configured endpoint with the session's current token
    pub async fn connect_for(
        config: &GraphqlConfig,
        session: &SessionContext,
    ) -> RealtimeResult<Self> {
        let token = session.access_token().ok_or(ClientError::NotSignedIn)?;
        Self::connect(&config.ws_url, Some(&token)).await
    }

    #[instrument(skip(access_token), fields(url = %url))]
    pub async fn connect_with_timeout(
        url: &Url,
        access_token: Option<&str>,
        ack_timeout: Duration,
    ) -> RealtimeResult<Self> {
        let mut request = url.as_str().into_client_request()?;
        request
            .headers_mut()
            .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(SUBPROTOCOL));

        let (socket, _response) = connect_async(request).await?;
        let (mut sink, mut stream) = socket.split();

        sink.send(text(&ProtocolMessage::connection_init(access_token))?)
            .await?;
        tokio::time::timeout(ack_timeout, await_ack(&mut sink, &mut stream))
            .await
            .map_err(|_| RealtimeError::AckTimeout)??;
        info!("Subscription connection acknowledged");

        let (outgoing, queue) = mpsc::unbounded_channel();
        let routes: Routes = Arc::new(DashMap::new());
        let closed = Arc::new(AtomicBool::new(false));

        let writer = tokio::spawn(write_loop(sink, queue));
        let reader = tokio::spawn(read_loop(
            stream,
            routes.clone(),
            outgoing.clone(),
            closed.clone(),
        ));

        Ok(Self {
            outgoing,
            routes,
            next_id: AtomicU64::new(1),
            closed,
            reader,
            writer,
        })
    }

    /// Start a subscription
    pub fn subscribe<O: Operation>(
        &self,
        variables: &O::Variables,
    ) -> RealtimeResult<SubscriptionStream<O::Data>> {
        if O::KIND != OperationKind::Subscription {
            return Err(RealtimeError::Protocol(format!(
                "{} is not a subscription",
                O::NAME
            )));
        }
        if self.is_closed() {
            return Err(closed_error(None, "client closed"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let request = GraphqlRequest::of::<O>(variables)?;
        let (tx, rx) = mpsc::unbounded_channel();
        self.routes.insert(id.clone(), tx);

        if let Err(err) = self.send(&ProtocolMessage::subscribe(id.as_str(), request)) {
            self.routes.remove(&id);
            return Err(err);
        }
        debug!(operation = O::NAME, id = %id, "Subscribed");

        Ok(SubscriptionStream::new(
            id,
            O::NAME,
            rx,
            self.routes.clone(),
            self.outgoing.clone(),
        ))
    }

    /// Number of subscriptions still running
    pub fn active_subscriptions(&self) -> usize {
        self.routes.len()
    }

    /// True once closed locally, by the server, or after a write failure
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.writer.is_finished()
    }

    /// End every subscription and close the socket
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        // Dropping the senders ends every stream
        self.routes.clear();
        let _ = self.outgoing.send(Message::Close(None));
        self.reader.abort();
        debug!("Subscription client closed");
    }

    fn send(&self, message: &ProtocolMessage) -> RealtimeResult<()> {
        self.outgoing
            .send(text(message)?)
            .map_err(|_| closed_error(None, "writer stopped"))
    }
}

impl Drop for SubscriptionClient {
    fn drop(&mut self) {
        // The writer stops on its own after flushing the close frame
        self.close();
    }
}

async fn await_ack(
    sink: &mut SplitSink<Socket, Message>,
    stream: &mut SplitStream<Socket>,
) -> RealtimeResult<()> {
    loop {
        match stream.next().await {
            None => return Err(closed_error(None, "closed before connection_ack")),
            Some(Err(err)) => return Err(err.into()),
            Some(Ok(Message::Text(frame))) => match ProtocolMessage::from_json(&frame)? {
                ProtocolMessage::ConnectionAck { .. } => return Ok(()),
                ProtocolMessage::Ping { .. } => sink.send(text(&ProtocolMessage::pong())?).await?,
                other => {
                    return Err(RealtimeError::Protocol(format!(
                        "unexpected {other} before connection_ack"
                    )))
                }
            },
            Some(Ok(Message::Close(frame))) => {
                let (code, reason) = close_details(frame.as_ref());
                return Err(closed_error(code, &reason));
            }
            Some(Ok(_)) => {}
        }
    }
}

async fn write_loop(
    mut sink: SplitSink<Socket, Message>,
    mut queue: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(message) = queue.recv().await {
        let is_close = matches!(message, Message::Close(_));
        if let Err(err) = sink.send(message).await {
            debug!(error = %err, "Socket write failed");
            break;
        }
        if is_close {
            break;
        }
    }
    let _ = sink.close().await;
}

async fn read_loop(
    mut stream: SplitStream<Socket>,
    routes: Routes,
    outgoing: mpsc::UnboundedSender<Message>,
    closed: Arc<AtomicBool>,
) {
    let (code, reason) = loop {
        match stream.next().await {
            None => break (None, "connection ended".to_string()),
            Some(Err(err)) => break (None, err.to_string()),
            Some(Ok(Message::Text(frame))) => match ProtocolMessage::from_json(&frame) {
                Ok(message) => dispatch(message, &routes, &outgoing),
                Err(err) => warn!(error = %err, "Undecodable frame"),
            },
            Some(Ok(Message::Close(frame))) => break close_details(frame.as_ref()),
            Some(Ok(_)) => {}
        }
    };

    closed.store(true, Ordering::SeqCst);
    warn!(code = ?code, reason = %reason, "Subscription connection closed");

    let ids: Vec<String> = routes.iter().map(|entry| entry.key().clone()).collect();
    for id in ids {
        if let Some((_, tx)) = routes.remove(&id) {
            let _ = tx.send(Err(closed_error(code, &reason)));
        }
    }
}

fn dispatch(
    message: ProtocolMessage,
    routes: &Routes,
    outgoing: &mpsc::UnboundedSender<Message>,
) {
    match message {
        ProtocolMessage::Next { id, payload } => {
            let delivered = routes.get(&id).map(|tx| tx.send(Ok(payload)).is_ok());
            match delivered {
                Some(true) => {}
                Some(false) => {
                    routes.remove(&id);
                }
                None => debug!(id = %id, "Result for unknown subscription"),
            }
        }
        ProtocolMessage::Error { id, payload } => {
            if let Some((_, tx)) = routes.remove(&id) {
                let (message, code) = payload
                    .first()
                    .map(|e| (e.message.clone(), e.code().map(String::from)))
                    .unwrap_or_else(|| ("Subscription failed".to_string(), None));
                let err = ClientError::from_graphql(message, code.as_deref(), 200);
                let _ = tx.send(Err(err.into()));
            }
        }
        ProtocolMessage::Complete { id } => {
            routes.remove(&id);
            debug!(id = %id, "Subscription completed by server");
        }
        ProtocolMessage::Ping { .. } => {
            if let Ok(pong) = text(&ProtocolMessage::pong()) {
                let _ = outgoing.send(pong);
            }
        }
        ProtocolMessage::Pong { .. } | ProtocolMessage::ConnectionAck { .. } => {}
        other => warn!(frame = %other, "Unexpected frame from server"),
    }
}

fn text(message: &ProtocolMessage) -> RealtimeResult<Message> {
    Ok(Message::Text(message.to_json()?))
}

fn close_details(frame: Option<&CloseFrame<'_>>) -> (Option<u16>, String) {
    frame.map_or((None, "closed without frame".to_string()), |frame| {
        (Some(u16::from(frame.code)), frame.reason.to_string())
    })
}

fn closed_error(code: Option<u16>, reason: &str) -> RealtimeError {
    RealtimeError::ConnectionClosed {
        code,
        reason: reason.to_string(),
    }
}
