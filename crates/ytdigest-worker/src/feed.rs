//! Feed reader: watermark, fetch with retry, liveness filter.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};
use ytdigest_models::{filter_candidates, Video};
use ytdigest_store::WatermarkStore;

use crate::error::WorkerResult;
use crate::retry::{retry_fixed, FeedRetryPolicy};
use crate::youtube::FeedSource;

/// Reads new uploads since the last successful check.
pub struct FeedReader {
    source: Arc<dyn FeedSource>,
    watermark: WatermarkStore,
    retry: FeedRetryPolicy,
}

impl FeedReader {
    pub fn new(source: Arc<dyn FeedSource>, watermark: WatermarkStore, retry: FeedRetryPolicy) -> Self {
        Self {
            source,
            watermark,
            retry,
        }
    }

    /// Published videos since the watermark, in feed order.
    ///
    /// Never fails: when every attempt errors, the cycle yields nothing and
    /// the watermark stays put. On success (even an empty one) the
    /// watermark moves to the time this cycle started.
    pub async fn check_new_videos(&self) -> Vec<Video> {
        let cycle_start = Utc::now();
        let published_after = self.watermark.load().await;
        debug!(%published_after, "Checking for new videos");

        let videos = match self.fetch_videos_since(published_after).await {
            Ok(videos) => videos,
            Err(e) => {
                error!(
                    "YouTube API fetch failed after {} attempts: {}",
                    self.retry.max_attempts, e
                );
                return Vec::new();
            }
        };

        if let Err(e) = self.watermark.save(cycle_start).await {
            error!("Failed to save last check time: {}", e);
        }

        videos
    }

    /// Fetch and filter without touching the watermark.
    pub async fn fetch_videos_since(&self, published_after: DateTime<Utc>) -> WorkerResult<Vec<Video>> {
        let candidates = retry_fixed(&self.retry, "feed_fetch", || {
            self.source.fetch_candidates(published_after)
        })
        .await?;

        let total = candidates.len();
        for candidate in candidates.iter().filter(|c| !c.live_status.is_published()) {
            info!(
                video_id = %candidate.video_id,
                status = %candidate.live_status,
                "Skipping unpublished video: {}",
                candidate.title
            );
        }

        let videos = filter_candidates(candidates);
        info!(candidates = total, published = videos.len(), "Feed filtered");
        Ok(videos)
    }

    pub fn watermark(&self) -> &WatermarkStore {
        &self.watermark
    }
}
