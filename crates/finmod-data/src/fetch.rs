//! Fetching JSON payloads over HTTP.

use crate::error::{DataError, Result};
use reqwest::Url;
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Default user agent sent with every request
const USER_AGENT: &str = concat!("finmod/", env!("CARGO_PKG_VERSION"));

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Something that can turn a URL into a decoded JSON document.
///
/// [`FinancialsClient`](crate::FinancialsClient) talks to the network only
/// through this trait, so a stub can stand in for the real endpoint.
pub trait JsonFetcher {
    /// Fetch `url` and decode the body as JSON.
    ///
    /// # Errors
    /// Returns `DataError::Parser` when no response could be obtained and
    /// `DataError::Json` when the body is not valid JSON.
    fn fetch_json(&self, url: &str) -> Result<Value>;
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// User agent header
    pub user_agent: String,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Blocking HTTP implementation of [`JsonFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default user agent and a 30 second timeout.
    pub fn new() -> Result<Self> {
        Self::with_config(&HttpConfig::default())
    }

    /// Create a fetcher with custom settings.
    ///
    /// # Example
    /// ```no_run
    /// use finmod_data::{HttpConfig, HttpFetcher};
    /// use std::time::Duration;
    ///
    /// # fn example() -> finmod_data::Result<()> {
    /// let config = HttpConfig {
    ///     timeout: Duration::from_secs(5),
    ///     ..HttpConfig::default()
    /// };
    /// let fetcher = HttpFetcher::with_config(&config)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(DataError::Network)?;

        Ok(Self { client })
    }
}

impl JsonFetcher for HttpFetcher {
    fn fetch_json(&self, url: &str) -> Result<Value> {
        let parsed = Url::parse(url).map_err(|e| DataError::parser(url, e))?;

        debug!(%url, "fetching statement");
        let response = self
            .client
            .get(parsed)
            .send()
            .map_err(|e| DataError::parser(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "statement request failed");
            return Err(DataError::parser(url, format!("HTTP {status}")));
        }

        let body = response.text().map_err(|e| DataError::parser(url, e))?;

        // Decode failures surface as DataError::Json, never as Parser.
        Ok(serde_json::from_str(&body)?)
    }
}
