//! WebSocket subscription client

mod client;
mod stream;

pub use client::{SubscriptionClient, DEFAULT_ACK_TIMEOUT};
pub use stream::SubscriptionStream;

use std::sync::Arc;

use dashmap::DashMap;
use pairing_client::graphql::GraphqlResponse;
use tokio::sync::mpsc;

use crate::error::RealtimeResult;

/// Live subscriptions by protocol id
type Routes = Arc<DashMap<String, mpsc::UnboundedSender<RealtimeResult<GraphqlResponse>>>>;
