//! Worker metrics.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding process installs a recorder.

use metrics::counter;

/// Metric names as constants for consistency.
pub mod names {
    pub const VIDEOS_PROCESSED_TOTAL: &str = "ytdigest_videos_processed_total";
    pub const VIDEOS_FAILED_TOTAL: &str = "ytdigest_videos_failed_total";
    pub const RETRIES_TOTAL: &str = "ytdigest_retries_total";
    pub const MESSAGES_TOTAL: &str = "ytdigest_messages_total";
}

/// Record a video that completed the pipeline.
pub fn record_video_processed() {
    counter!(names::VIDEOS_PROCESSED_TOTAL).increment(1);
}

/// Record a video skipped after a per-item failure.
pub fn record_video_failed(stage: &'static str) {
    counter!(names::VIDEOS_FAILED_TOTAL, "stage" => stage).increment(1);
}

/// Record a retry of `operation` (e.g. `summarize`, `feed_fetch`).
pub fn record_retry(operation: &'static str) {
    counter!(names::RETRIES_TOTAL, "operation" => operation).increment(1);
}

/// Record chunk outcomes of one dispatched message.
pub fn record_dispatch(sent: usize, queued: usize, rejected: usize) {
    for (outcome, count) in [("sent", sent), ("queued", queued), ("rejected", rejected)] {
        if count > 0 {
            counter!(names::MESSAGES_TOTAL, "outcome" => outcome).increment(count as u64);
        }
    }
}
