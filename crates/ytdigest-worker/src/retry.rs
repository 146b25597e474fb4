//! Retry policies for the flaky upstream APIs.
//!
//! Two shapes are used:
//! - the feed fetch retries any error a fixed number of times with a fixed delay
//! - the summarizer classifies each failure and picks a delay per class

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::WorkerError;
use crate::metrics::record_retry;

// =============================================================================
// Fixed-delay retry
// =============================================================================

/// Fixed-delay retry for the feed fetch.
#[derive(Debug, Clone)]
pub struct FeedRetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl Default for FeedRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// Run `operation` until it succeeds or `policy.max_attempts` are spent.
///
/// Every error is retried. The last error is returned on exhaustion.
pub async fn retry_fixed<F, Fut, T, E>(
    policy: &FeedRetryPolicy,
    operation_name: &'static str,
    operation: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts => {
                debug!("{} attempt {} failed: {}", operation_name, attempt, e);
                record_retry(operation_name);
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

// =============================================================================
// Summarizer policy
// =============================================================================

/// What to do after a failed summarization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Surface the error.
    Fail,
    /// Wait, then try again.
    RetryAfter(Duration),
}

/// Attempt budget and delays for summarization.
#[derive(Debug, Clone)]
pub struct SummarizerPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Wait after HTTP 429.
    pub rate_limit_delay: Duration,
    /// First backoff for other errors; doubles per attempt.
    pub base_delay: Duration,
}

impl Default for SummarizerPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            rate_limit_delay: Duration::from_secs(60),
            base_delay: Duration::from_secs(1),
        }
    }
}

impl SummarizerPolicy {
    /// Decide after attempt number `attempt` (1-based) failed with `error`.
    pub fn decide(&self, error: &WorkerError, attempt: u32) -> RetryDecision {
        if error.is_config_error() {
            warn!("Summarization aborted, credentials rejected: {}", error);
            return RetryDecision::Fail;
        }
        if error.is_timeout() {
            return RetryDecision::Fail;
        }
        if attempt >= self.max_attempts {
            return RetryDecision::Fail;
        }
        if error.is_rate_limited() {
            return RetryDecision::RetryAfter(self.rate_limit_delay);
        }
        RetryDecision::RetryAfter(self.backoff(attempt))
    }

    /// Backoff after the `attempt`-th failure: base, 2×base, 4×base, ...
    fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(2u32.pow(exp))
    }
}
