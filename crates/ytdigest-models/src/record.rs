//! Dedup store record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::video::VideoId;

/// A video that went through the whole pipeline.
///
/// Serialized with the `videoId` / `title` / `processedAt` keys of the
/// on-disk store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedRecord {
    pub video_id: VideoId,
    #[serde(default)]
    pub title: String,
    pub processed_at: DateTime<Utc>,
}

impl ProcessedRecord {
    /// Record stamped with the current time.
    pub fn now(video_id: impl Into<VideoId>, title: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            processed_at: Utc::now(),
        }
    }
}
