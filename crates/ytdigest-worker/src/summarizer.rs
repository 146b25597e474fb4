//! Summarizer: one provider call per attempt, retried per [`SummarizerPolicy`].

use std::sync::Arc;

use tracing::{info, warn};
use ytdigest_models::Summary;

use crate::error::WorkerResult;
use crate::gemini::SummaryProvider;
use crate::metrics::record_retry;
use crate::retry::{RetryDecision, SummarizerPolicy};

pub struct Summarizer {
    provider: Arc<dyn SummaryProvider>,
    policy: SummarizerPolicy,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn SummaryProvider>, policy: SummarizerPolicy) -> Self {
        Self { provider, policy }
    }

    /// Summarize the video at `video_url`.
    ///
    /// Auth failures and timeouts surface at once; rate limits and other
    /// errors are retried within the attempt budget.
    pub async fn summarize(&self, video_url: &str) -> WorkerResult<Summary> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let error = match self.provider.generate_summary(video_url).await {
                Ok(summary) => {
                    info!(attempt, tokens = summary.token_count, "Summary received");
                    return Ok(summary);
                }
                Err(e) => e,
            };

            match self.policy.decide(&error, attempt) {
                RetryDecision::Fail => return Err(error),
                RetryDecision::RetryAfter(delay) => {
                    if error.is_rate_limited() {
                        warn!("Gemini rate limited, waiting {:?} before retry", delay);
                    } else {
                        warn!(attempt, "Summarization attempt failed, retrying in {:?}: {}", delay, error);
                    }
                    record_retry("summarize");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
