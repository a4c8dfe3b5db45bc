//! GraphQL over HTTP

use std::time::Duration;

use async_trait::async_trait;
use pairing_common::GraphqlConfig;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};
use url::Url;

use super::operation::{GraphqlRequest, GraphqlResponse};
use crate::error::{ClientError, ClientResult};

/// Sends one GraphQL request and returns its `data`, or the classified error
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    async fn execute(
        &self,
        request: &GraphqlRequest,
        access_token: Option<&str>,
    ) -> ClientResult<serde_json::Value>;
}

/// reqwest-based transport posting `{query, variables, operationName}`
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: Url, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &GraphqlConfig) -> ClientResult<Self> {
        Self::new(config.http_url.clone(), config.timeout())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl GraphqlTransport for HttpTransport {
    #[instrument(skip_all, fields(operation = %request.operation_name))]
    async fn execute(
        &self,
        request: &GraphqlRequest,
        access_token: Option<&str>,
    ) -> ClientResult<serde_json::Value> {
        let mut builder = self.client.post(self.endpoint.clone()).json(request);
        if let Some(token) = access_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "GraphQL response");

        let envelope = serde_json::from_str::<GraphqlResponse>(&body).ok();
        interpret(status, envelope, body)
    }
}

/// Turn an HTTP status and optional envelope into data or a classified error
fn interpret(
    status: StatusCode,
    envelope: Option<GraphqlResponse>,
    raw_body: String,
) -> ClientResult<serde_json::Value> {
    match envelope {
        Some(response) => {
            if let Some(error) = response.first_error() {
                return Err(ClientError::from_graphql(
                    error.message.clone(),
                    error.code(),
                    status.as_u16(),
                ));
            }
            if !status.is_success() {
                return Err(status_error(status, raw_body));
            }
            match response.data {
                Some(data) if !data.is_null() => Ok(data),
                _ => Err(ClientError::Decode("response carried no data".to_string())),
            }
        }
        None if status.is_success() => Err(ClientError::Decode(format!(
            "response is not a GraphQL envelope: {}",
            truncate(&raw_body)
        ))),
        None => Err(status_error(status, raw_body)),
    }
}

fn status_error(status: StatusCode, raw_body: String) -> ClientError {
    let message = if raw_body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        truncate(&raw_body).to_string()
    };
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ClientError::from_graphql(message, None, status.as_u16())
        }
        _ => ClientError::Http {
            status: status.as_u16(),
            message,
        },
    }
}

fn truncate(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
