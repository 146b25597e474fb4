//! Video feed models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::watch_url;

/// Platform-assigned video identifier (the 11-character YouTube id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// `liveStreamingDetails` block of the videos endpoint.
///
/// All fields are optional; regular uploads have no block at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStreamingDetails {
    #[serde(default)]
    pub scheduled_start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actual_start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actual_end_time: Option<DateTime<Utc>>,
}

/// Liveness of a candidate, derived once during enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveStatus {
    /// Premiere or stream scheduled in the future.
    Upcoming { scheduled_start: DateTime<Utc> },
    /// Stream started and has not ended yet.
    Live { started_at: DateTime<Utc> },
    /// Finished stream, now a regular VOD.
    Ended { ended_at: DateTime<Utc> },
    /// Regular upload.
    NotLive,
}

impl LiveStatus {
    /// Classify a video from its live streaming details as seen at `now`.
    ///
    /// A future scheduled start wins over everything else, then an open
    /// stream (start without end), then a closed one.
    pub fn from_details(details: Option<&LiveStreamingDetails>, now: DateTime<Utc>) -> Self {
        let Some(details) = details else {
            return LiveStatus::NotLive;
        };

        if let Some(scheduled_start) = details.scheduled_start_time {
            if scheduled_start > now {
                return LiveStatus::Upcoming { scheduled_start };
            }
        }

        match (details.actual_start_time, details.actual_end_time) {
            (Some(started_at), None) => LiveStatus::Live { started_at },
            (_, Some(ended_at)) => LiveStatus::Ended { ended_at },
            (None, None) => LiveStatus::NotLive,
        }
    }

    /// Whether a video with this status can be summarized now.
    pub fn is_published(&self) -> bool {
        matches!(self, LiveStatus::Ended { .. } | LiveStatus::NotLive)
    }

    /// Short label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            LiveStatus::Upcoming { .. } => "upcoming",
            LiveStatus::Live { .. } => "live",
            LiveStatus::Ended { .. } => "ended",
            LiveStatus::NotLive => "not_live",
        }
    }
}

impl fmt::Display for LiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A video returned by the feed query, before liveness filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoCandidate {
    pub video_id: VideoId,
    pub title: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub live_status: LiveStatus,
}

impl VideoCandidate {
    /// Build a candidate; the watch URL is derived from the id.
    pub fn new(
        video_id: impl Into<VideoId>,
        title: impl Into<String>,
        published_at: DateTime<Utc>,
        live_status: LiveStatus,
    ) -> Self {
        let video_id = video_id.into();
        Self {
            url: watch_url(video_id.as_str()),
            video_id,
            title: title.into(),
            published_at,
            live_status,
        }
    }

    /// Drop liveness metadata.
    pub fn into_video(self) -> Video {
        Video {
            video_id: self.video_id,
            title: self.title,
            url: self.url,
            published_at: self.published_at,
        }
    }
}

/// A published video ready for summarization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub video_id: VideoId,
    pub title: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
}

impl Video {
    pub fn new(video_id: impl Into<VideoId>, title: impl Into<String>, published_at: DateTime<Utc>) -> Self {
        let video_id = video_id.into();
        Self {
            url: watch_url(video_id.as_str()),
            video_id,
            title: title.into(),
            published_at,
        }
    }
}

/// Drop unreleased premieres and in-progress streams, keeping feed order.
pub fn filter_candidates(candidates: Vec<VideoCandidate>) -> Vec<Video> {
    candidates
        .into_iter()
        .filter(|c| c.live_status.is_published())
        .map(VideoCandidate::into_video)
        .collect()
}
