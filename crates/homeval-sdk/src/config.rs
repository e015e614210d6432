//! Client configuration.

use std::env;
use std::time::Duration;

use homeval_core::{HomevalError, Result};
use reqwest::Url;

/// Target used when nothing is configured: a locally running valuation service.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/predict";

const DEFAULT_USER_AGENT: &str = concat!("homeval-sdk/", env!("CARGO_PKG_VERSION"));

/// Where and how to reach the prediction service.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Absolute URL, or a path resolved against `base_url`.
    pub endpoint: String,

    /// Base for a relative `endpoint`.
    pub base_url: Option<String>,

    /// Whole-request timeout. `None` leaves it to the HTTP client.
    pub timeout: Option<Duration>,

    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            base_url: None,
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration for the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the base URL for a relative endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Load from the process environment, reading `.env` first if present.
    ///
    /// Recognised variables: `HOMEVAL_ENDPOINT`, `HOMEVAL_BASE_URL`,
    /// `HOMEVAL_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("HOMEVAL_ENDPOINT") {
            config.endpoint = endpoint;
        }
        config.base_url = lookup("HOMEVAL_BASE_URL").filter(|base| !base.trim().is_empty());

        if let Some(raw) = lookup("HOMEVAL_TIMEOUT_MS") {
            let millis = raw.trim().parse::<u64>().map_err(|_| {
                HomevalError::Config(format!("HOMEVAL_TIMEOUT_MS must be a whole number, got '{raw}'"))
            })?;
            config.timeout = Some(Duration::from_millis(millis));
        }

        Ok(config)
    }

    /// Resolve the final request URL.
    pub fn target(&self) -> Result<String> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(HomevalError::Config("endpoint is empty".to_string()));
        }

        if let Ok(url) = Url::parse(endpoint) {
            return Ok(url.to_string());
        }

        let base = self.base_url.as_deref().ok_or_else(|| {
            HomevalError::Config(format!(
                "relative endpoint '{endpoint}' needs HOMEVAL_BASE_URL"
            ))
        })?;

        let base = Url::parse(base)
            .map_err(|e| HomevalError::Config(format!("invalid base URL '{base}': {e}")))?;

        base.join(endpoint)
            .map(|url| url.to_string())
            .map_err(|e| HomevalError::Config(format!("cannot join '{endpoint}' onto '{base}': {e}")))
    }
}
