//! Integration test utilities for the pairing client
//!
//! This crate runs a fake backend (GraphQL over HTTP, `graphql-transport-ws`
//! subscriptions and the identity REST API) on a local port so the real
//! HTTP and WebSocket adapters can be exercised end to end.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
