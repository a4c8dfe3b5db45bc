//! GraphQL data access: typed operations, transport, cache and client

mod cache;
mod client;
mod operation;
mod transport;

pub use cache::{CacheKey, QueryCache};
pub use client::{BanGuard, GraphqlClient};
pub use operation::{
    ErrorExtensions, GraphqlErrorBody, GraphqlRequest, GraphqlResponse, NoVariables, Operation,
    OperationKind,
};
pub use transport::{GraphqlTransport, HttpTransport};

#[cfg(test)]
pub(crate) use client::tests::ScriptedTransport;
