//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - The `HttpClient` seam the engine fetches through
//! - Building the reqwest client with the identifying user agent
//! - Error classification into transport error kinds
//! - The retry loop driven by a `RetryPolicy`

use crate::config::{RetryConfig, UserAgentConfig};
use crate::crawler::{AttemptOutcome, RetryPolicy};
use crate::state::PageState;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Maximum number of redirects followed per request
const MAX_REDIRECTS: usize = 10;

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure to obtain any HTTP response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("request could not be sent: {0}")]
    Request(String),
}

impl TransportError {
    /// Timeouts and connection failures are worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connect(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_builder() || e.is_redirect() {
            Self::Request(e.to_string())
        } else if e.is_body() || e.is_decode() {
            Self::Malformed(e.to_string())
        } else {
            Self::Connect(e.to_string())
        }
    }
}

/// Performs HTTP GET requests on behalf of the crawler
///
/// Implementations must send the crawler's identifying user agent on every
/// request, robots.txt fetches included.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// Default `HttpClient` backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Builds a client from the user agent and retry configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use seekora::config::{RetryConfig, UserAgentConfig};
    /// use seekora::crawler::ReqwestHttpClient;
    ///
    /// let client =
    ///     ReqwestHttpClient::new(&UserAgentConfig::default(), &RetryConfig::default()).unwrap();
    /// ```
    pub fn new(user_agent: &UserAgentConfig, retry: &RetryConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent, retry)?,
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Malformed(e.to_string())
            }
        })?;

        Ok(HttpResponse { status, body })
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - Identification sent with every request
/// * `retry` - Supplies the per-attempt request and connect timeouts
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    retry: &RetryConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(retry.request_timeout())
        .connect_timeout(retry.connect_timeout())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Result of fetching one URL under a retry policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Page content is available
    Success {
        body: String,
        /// Attempts used, including the successful one
        attempts: u32,
    },

    /// The URL was given up on
    Abandoned {
        /// The page state this failure maps to
        state: PageState,
        attempts: u32,
        /// Description of the last attempt's failure
        reason: String,
    },

    /// Cancellation arrived during a request or a backoff delay
    Cancelled { attempts: u32 },
}

impl FetchOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. }
            | Self::Abandoned { attempts, .. }
            | Self::Cancelled { attempts } => *attempts,
        }
    }
}

/// Fetches a URL, retrying according to `policy`
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Success |
/// | HTTP 429 | Retry after backoff → RateLimited when exhausted |
/// | HTTP 5xx | Retry after backoff → Failed when exhausted |
/// | Other HTTP status | Immediate → DeadLink |
/// | Timeout / connection failure | Retry after backoff → Unreachable when exhausted |
/// | Malformed response | Immediate → DeadLink |
///
/// Requests and backoff delays both stop early when `cancel` fires.
pub async fn fetch_with_retry(
    client: &dyn HttpClient,
    url: &str,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> FetchOutcome {
    let mut attempt = 0;

    loop {
        attempt += 1;

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return FetchOutcome::Cancelled { attempts: attempt },
            result = client.get(url) => result,
        };

        let reason = describe(&result);
        match (RetryPolicy::classify(&result), result) {
            (AttemptOutcome::Success, Ok(response)) => {
                return FetchOutcome::Success {
                    body: response.body,
                    attempts: attempt,
                };
            }
            (AttemptOutcome::Retry, _) if attempt < policy.max_attempts => {
                let delay = policy.delay(attempt);
                tracing::debug!(
                    "Attempt {}/{} for {} failed ({}), retrying in {:?}",
                    attempt,
                    policy.max_attempts,
                    url,
                    reason,
                    delay
                );

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return FetchOutcome::Cancelled { attempts: attempt },
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            (_, result) => {
                return FetchOutcome::Abandoned {
                    state: RetryPolicy::failure_state(&result),
                    attempts: attempt,
                    reason,
                };
            }
        }
    }
}

fn describe(result: &Result<HttpResponse, TransportError>) -> String {
    match result {
        Ok(response) => format!("HTTP {}", response.status),
        Err(e) => e.to_string(),
    }
}
