//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building the shared HTTP client with browser-like headers
//! - The `Transport` seam between the retry logic and the network
//! - Bounded retries with a politeness delay after each success
//! - Cancellation of in-flight requests and delays

use crate::config::{FetchConfig, HttpConfig};
use crate::{ConfigError, FetchError, HarvestError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Status and body of one HTTP response, whatever the status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// A page retrieved with a 2xx status
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: Url,
    /// HTTP status code
    pub status: u16,
    /// Page body
    pub body: String,
    /// Number of attempts it took, starting at 1
    pub attempts: u32,
}

/// A single GET request with no retry logic
///
/// Implementations return non-2xx responses as data; classifying them is the
/// fetcher's job.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_page(&self, url: &Url) -> Result<RawResponse, FetchError>;
}

#[async_trait]
impl Transport for Client {
    async fn get_page(&self, url: &Url) -> Result<RawResponse, FetchError> {
        let response = self
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| transport_error(url, e))?;

        Ok(RawResponse { status, body })
    }
}

fn transport_error(url: &Url, error: reqwest::Error) -> FetchError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    };

    FetchError::Transport {
        url: url.to_string(),
        message,
    }
}

/// Builds the HTTP client shared by every request of a run
///
/// The client keeps a cookie store (when enabled) so that the whole run looks
/// like one browsing session, and sends the configured `User-Agent`,
/// `Accept` and `Accept-Language` headers.
///
/// # Example
///
/// ```no_run
/// use listing_harvest::config::HttpConfig;
/// use listing_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, HarvestError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, header_value("accept", &config.accept)?);
    headers.insert(
        ACCEPT_LANGUAGE,
        header_value("accept-language", &config.accept_language)?,
    );

    let timeout = Duration::from_secs(config.timeout_secs);

    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout)
        .cookie_store(config.cookies)
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value)
        .map_err(|e| ConfigError::Validation(format!("invalid {} header: {}", name, e)))
}

/// Retry bounds and politeness delays for one fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first one included (at least 1)
    pub max_attempts: u32,
    /// Delay after a successful first attempt
    pub politeness_delay: Duration,
    /// Extra delay per attempt index
    pub politeness_step: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, politeness_delay: Duration, politeness_step: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            politeness_delay,
            politeness_step,
        }
    }

    /// Delay applied after attempt `attempt_index` (0-based) succeeded
    pub fn delay_after(&self, attempt_index: u32) -> Duration {
        self.politeness_step
            .saturating_mul(attempt_index)
            .saturating_add(self.politeness_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000), Duration::from_millis(500))
    }
}

impl From<&FetchConfig> for RetryPolicy {
    fn from(config: &FetchConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.politeness_delay_ms),
            Duration::from_millis(config.politeness_step_ms),
        )
    }
}

/// Fetches pages with bounded retries
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | 2xx | Sleep `delay + index * step`, return the page |
/// | Any other status | Retry immediately |
/// | Transport error | Retry immediately |
/// | Attempts exhausted | `FetchError::Exhausted` wrapping the last error |
/// | Token cancelled | `FetchError::Cancelled`, no further attempt |
///
/// Status codes are not interpreted beyond success or failure; a 404 that
/// really means "past the last page" is left to the caller.
pub struct ResilientFetcher<T = Client> {
    transport: T,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl<T: Transport> ResilientFetcher<T> {
    pub fn new(transport: T, policy: RetryPolicy, cancel: CancellationToken) -> Self {
        Self {
            transport,
            policy,
            cancel,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches `url`, retrying failed attempts up to the policy's bound
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let mut attempt: u32 = 0;

        loop {
            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(FetchError::Cancelled { url: url.to_string() });
                }
                result = self.transport.get_page(url) => result,
            };

            match result.and_then(|raw| require_success(url, raw)) {
                Ok(raw) => {
                    pause(&self.cancel, self.policy.delay_after(attempt)).await;
                    return Ok(FetchedPage {
                        url: url.clone(),
                        status: raw.status,
                        body: raw.body,
                        attempts: attempt + 1,
                    });
                }
                Err(error) => {
                    tracing::warn!("Attempt {} failed for {}: {}", attempt + 1, url, error);
                    attempt += 1;

                    if attempt >= self.policy.max_attempts {
                        return Err(FetchError::Exhausted {
                            url: url.to_string(),
                            attempts: attempt,
                            last: Box::new(error),
                        });
                    }
                }
            }
        }
    }
}

fn require_success(url: &Url, raw: RawResponse) -> Result<RawResponse, FetchError> {
    if (200..300).contains(&raw.status) {
        Ok(raw)
    } else {
        Err(FetchError::Status {
            url: url.to_string(),
            status: raw.status,
        })
    }
}

/// Sleeps for `delay` unless the token fires first
///
/// Returns `false` if the sleep was cut short by cancellation.
pub(crate) async fn pause(cancel: &CancellationToken, delay: Duration) -> bool {
    if delay.is_zero() {
        return !cancel.is_cancelled();
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
