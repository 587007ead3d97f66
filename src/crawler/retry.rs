//! Retry policy for page fetches
//!
//! The policy is a plain value: an attempt budget, a classifier deciding
//! whether an attempt's result is worth retrying, and a backoff function.

use crate::config::{BackoffStrategy, RetryConfig};
use crate::crawler::{HttpResponse, TransportError};
use crate::state::PageState;
use std::time::Duration;

/// Delay inserted before each retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry
    Fixed(Duration),
    /// `base * 2^(retry - 1)`, capped at `max`
    Exponential { base: Duration, max: Duration },
}

impl Backoff {
    /// Delay before retry number `retry` (1 = first retry)
    pub fn delay(&self, retry: u32) -> Duration {
        match *self {
            Self::Fixed(delay) => delay,
            Self::Exponential { base, max } => {
                let factor = 2u32.saturating_pow(retry.saturating_sub(1).min(20));
                base.saturating_mul(factor).min(max)
            }
        }
    }
}

/// What to do after one fetch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Content is usable
    Success,
    /// Worth another attempt if the budget allows
    Retry,
    /// Give up on the URL now
    Abandon,
}

/// Attempt budget plus backoff for page fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per URL, including the first one
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Fixed(Duration::from_secs(5)),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Builds the policy described by the `[retry]` configuration section
    pub fn from_config(config: &RetryConfig) -> Self {
        let base = Duration::from_millis(config.backoff_ms);
        let backoff = match config.backoff {
            BackoffStrategy::Fixed => Backoff::Fixed(base),
            BackoffStrategy::Exponential => Backoff::Exponential {
                base,
                max: Duration::from_millis(config.max_backoff_ms),
            },
        };
        Self::new(config.max_attempts, backoff)
    }

    /// Classifies the result of one attempt
    ///
    /// | Result | Outcome |
    /// |--------|---------|
    /// | 2xx | Success |
    /// | 429 | Retry |
    /// | 5xx | Retry |
    /// | other status | Abandon |
    /// | timeout, connection failure | Retry |
    /// | malformed response, bad request | Abandon |
    pub fn classify(result: &Result<HttpResponse, TransportError>) -> AttemptOutcome {
        match result {
            Ok(response) if response.is_success() => AttemptOutcome::Success,
            Ok(response) if response.status == 429 || response.status >= 500 => {
                AttemptOutcome::Retry
            }
            Ok(_) => AttemptOutcome::Abandon,
            Err(e) if e.is_retryable() => AttemptOutcome::Retry,
            Err(_) => AttemptOutcome::Abandon,
        }
    }

    /// Delay before retry number `retry` (1 = first retry)
    pub fn delay(&self, retry: u32) -> Duration {
        self.backoff.delay(retry)
    }

    /// Terminal state of a URL whose last attempt produced `result`
    ///
    /// Only meaningful for results that are not `Success`.
    pub fn failure_state(result: &Result<HttpResponse, TransportError>) -> PageState {
        match result {
            Ok(response) if response.status == 429 => PageState::RateLimited,
            Ok(response) if response.status >= 500 => PageState::Failed,
            Ok(_) => PageState::DeadLink,
            Err(TransportError::Timeout) | Err(TransportError::Connect(_)) => {
                PageState::Unreachable
            }
            Err(TransportError::Malformed(_)) => PageState::DeadLink,
            Err(TransportError::Request(_)) => PageState::Failed,
        }
    }
}
