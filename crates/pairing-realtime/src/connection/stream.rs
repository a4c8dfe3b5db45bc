//! Typed stream of one subscription's results

use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use pairing_client::graphql::GraphqlResponse;
use pairing_client::ClientError;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use super::Routes;
use crate::error::{RealtimeError, RealtimeResult};
use crate::protocol::ProtocolMessage;

/// Results of one subscription; dropping it sends `complete`
pub struct SubscriptionStream<T> {
    id: String,
    operation: &'static str,
    rx: mpsc::UnboundedReceiver<RealtimeResult<GraphqlResponse>>,
    routes: Routes,
    outgoing: mpsc::UnboundedSender<Message>,
    _data: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> SubscriptionStream<T> {
    pub(super) fn new(
        id: String,
        operation: &'static str,
        rx: mpsc::UnboundedReceiver<RealtimeResult<GraphqlResponse>>,
        routes: Routes,
        outgoing: mpsc::UnboundedSender<Message>,
    ) -> Self {
        Self {
            id,
            operation,
            rx,
            routes,
            outgoing,
            _data: PhantomData,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Next result; `None` once the server completes or the connection ends
    pub async fn recv(&mut self) -> Option<RealtimeResult<T>> {
        self.rx.recv().await.map(|item| item.and_then(decode))
    }
}

impl<T: DeserializeOwned> Stream for SubscriptionStream<T> {
    type Item = RealtimeResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx
            .poll_recv(cx)
            .map(|item| item.map(|result| result.and_then(decode)))
    }
}

impl<T> Drop for SubscriptionStream<T> {
    fn drop(&mut self) {
        // Route already gone means the server completed it
        if self.routes.remove(&self.id).is_none() {
            return;
        }
        if let Ok(text) = ProtocolMessage::complete(self.id.as_str()).to_json() {
            let _ = self.outgoing.send(Message::Text(text));
        }
        debug!(id = %self.id, operation = self.operation, "Subscription completed by client");
    }
}

fn decode<T: DeserializeOwned>(response: GraphqlResponse) -> RealtimeResult<T> {
    if let Some(error) = response.first_error() {
        return Err(ClientError::from_graphql(error.message.clone(), error.code(), 200).into());
    }
    let data = response
        .data
        .ok_or_else(|| RealtimeError::Protocol("next frame without data".into()))?;
    serde_json::from_value(data).map_err(Into::into)
}
