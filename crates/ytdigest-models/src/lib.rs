//! Shared data models for the channel digest worker.
//!
//! This crate provides Serde-serializable types for:
//! - Feed candidates and their liveness classification
//! - Bilingual summaries and the model response schema
//! - Dedup store records
//! - Timestamp and URL helpers

pub mod record;
pub mod summary;
pub mod timestamp;
pub mod utils;
pub mod video;

// Re-export common types
pub use record::ProcessedRecord;
pub use summary::{response_schema, KeyPoint, Language, LanguageSummary, Summary, SummaryPayload};
pub use timestamp::{create_timestamp_link, format_timestamp, timestamp_to_seconds};
pub use utils::{escape_attr, escape_html, extract_video_id, watch_url, YoutubeIdError};
pub use video::{filter_candidates, LiveStatus, LiveStreamingDetails, Video, VideoCandidate, VideoId};
