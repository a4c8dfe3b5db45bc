//! Typed GraphQL operations
//!
//! One type per query, mutation or subscription. The type carries the
//! document, its variables and response shapes, and for mutations the
//! queries whose cached results it makes stale.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Kind of GraphQL operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }
}

/// A named GraphQL operation with typed variables and data
pub trait Operation: Send + Sync + 'static {
    /// Operation name, also the cache namespace
    const NAME: &'static str;

    /// GraphQL document
    const DOCUMENT: &'static str;

    const KIND: OperationKind;

    /// Queries evicted from the cache after this mutation succeeds
    const INVALIDATES: &'static [&'static str] = &[];

    type Variables: Serialize + Send + Sync;

    type Data: DeserializeOwned + Send;
}

/// Variables for operations that take none; serializes to `{}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoVariables {}

/// Request body sent to the GraphQL endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub query: String,
    pub variables: serde_json::Value,
    pub operation_name: String,
}

impl GraphqlRequest {
    /// Build the request body for an operation
    pub fn of<O: Operation>(variables: &O::Variables) -> Result<Self, serde_json::Error> {
        Ok(Self {
            query: O::DOCUMENT.to_string(),
            variables: serde_json::to_value(variables)?,
            operation_name: O::NAME.to_string(),
        })
    }
}

/// `extensions` object of a GraphQL error
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorExtensions {
    #[serde(default)]
    pub code: Option<String>,
}

/// One entry of the GraphQL `errors` array
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphqlErrorBody {
    pub message: String,
    #[serde(default)]
    pub path: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub extensions: Option<ErrorExtensions>,
}

impl GraphqlErrorBody {
    pub fn code(&self) -> Option<&str> {
        self.extensions.as_ref().and_then(|ext| ext.code.as_deref())
    }
}

/// Response envelope: `{ data, errors }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlErrorBody>>,
}

impl GraphqlResponse {
    /// First error, if any
    pub fn first_error(&self) -> Option<&GraphqlErrorBody> {
        self.errors.as_ref().and_then(|errors| errors.first())
    }
}
