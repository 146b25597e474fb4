//! File-backed state for the channel digest worker.
//!
//! This crate provides:
//! - The dedup store of fully processed videos
//! - The "last checked" watermark used by the feed reader
//! - Atomic whole-file rewrites

pub mod error;
pub mod fs_utils;
pub mod processed;
pub mod watermark;

pub use error::{StoreError, StoreResult};
pub use processed::DedupStore;
pub use watermark::WatermarkStore;
