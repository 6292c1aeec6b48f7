//! SODA page fetcher with bounded retry
//!
//! Provides a client that handles:
//! - The `X-App-Token` header on every request
//! - Up to `max_attempts` tries per page, no 4xx/5xx distinction
//! - JSON array decoding of a 200 body
//! - One audit log entry per terminal outcome

use crate::audit::AuditLog;
use crate::error::{Error, Result};
use crate::types::Page;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Header carrying the app token
pub const APP_TOKEN_HEADER: &str = "X-App-Token";

/// Attempts per page before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of attempts per page (at least one is always made)
    pub max_attempts: u32,
    /// Pause between attempts
    pub retry_delay: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: Duration::ZERO,
            user_agent: format!("soda-fetch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max attempts
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    /// Set the pause between attempts
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Terminal outcome of one page fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// HTTP 200 with a decoded record array (possibly empty)
    Success(Page),
    /// The attempt budget ran out
    Failed {
        /// Last status received, `None` if no response ever arrived
        status: Option<u16>,
    },
}

/// HTTP client for SODA endpoints
pub struct SodaClient {
    client: Client,
    config: HttpClientConfig,
}

impl SodaClient {
    /// Create a client with default configuration
    pub fn new(token: &str) -> Result<Self> {
        Self::with_config(token, HttpClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(token: &str, config: HttpClientConfig) -> Result<Self> {
        let mut token_value = HeaderValue::from_str(token)
            .map_err(|e| Error::invalid_value("token", e.to_string()))?;
        token_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(APP_TOKEN_HEADER, token_value);

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Fetch one page.
    ///
    /// Returns `FetchOutcome::Failed` once every attempt has failed; that is
    /// not an error. Errors are reserved for a 200 whose body is not a JSON
    /// array of objects, and for audit log I/O.
    pub async fn fetch_page(&self, url: &str, audit: &AuditLog) -> Result<FetchOutcome> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut last_status = None;

        for attempt in 1..=max_attempts {
            match self.send(url).await {
                Ok(response) => {
                    audit.record(url, Some(StatusCode::OK.as_u16())).await?;
                    let page = decode_page(url, response).await?;
                    debug!("Fetched {} records from {}", page.len(), url);
                    return Ok(FetchOutcome::Success(page));
                }
                Err(e) if e.is_retryable() => {
                    if let Some(status) = e.status() {
                        last_status = Some(status);
                    }
                    warn!(
                        "Request failed ({}), attempt {}/{}",
                        e, attempt, max_attempts
                    );
                    if attempt < max_attempts && !self.config.retry_delay.is_zero() {
                        tokio::time::sleep(self.config.retry_delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            "Giving up on {} after {} attempts, last status: {}",
            url,
            max_attempts,
            last_status.map_or_else(|| "none".to_string(), |s| s.to_string())
        );
        audit.record(url, last_status).await?;
        Ok(FetchOutcome::Failed {
            status: last_status,
        })
    }

    /// Send one GET; any status other than 200 is an error
    async fn send(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }
        Ok(response)
    }
}

impl std::fmt::Debug for SodaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SodaClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Decode a 200 body as a JSON array of record objects
async fn decode_page(url: &str, response: Response) -> Result<Page> {
    let body = response
        .text()
        .await
        .map_err(|e| Error::malformed(url, format!("failed to read body: {e}")))?;

    serde_json::from_str::<Page>(&body).map_err(|e| Error::malformed(url, e.to_string()))
}
