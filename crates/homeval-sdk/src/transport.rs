//! Transport to the prediction service.

use async_trait::async_trait;
use homeval_core::{HomevalError, Result};
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;

/// Performs the outbound call for a prediction request.
///
/// Implementations return the parsed JSON body of a successful response, or
/// an error describing why none was obtained. Retries, timeouts and pooling
/// are the implementation's own business.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` as JSON to `target`.
    async fn post_json(&self, target: &str, body: &Value) -> Result<Value>;
}

/// [`Transport`] over HTTP.
#[derive(Clone)]
pub struct HttpTransport {
    /// HTTP client.
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a default HTTP client.
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Create a transport around an existing client.
    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    /// Create a transport honouring the timeout and user agent of `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http_client = builder
            .build()
            .map_err(|e| HomevalError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(http_client))
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, target: &str, body: &Value) -> Result<Value> {
        let response = self
            .http_client
            .post(target)
            .json(body)
            .send()
            .await
            .map_err(|e| HomevalError::Transport(e.to_string()))?;

        let status = response.status();
        debug!(%target, status = status.as_u16(), "prediction service responded");

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(HomevalError::TransportStatus {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| HomevalError::Transport(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| HomevalError::MalformedResponse(e.to_string()))
    }
}
