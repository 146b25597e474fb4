//! "Last checked" watermark.
//!
//! A single RFC 3339 timestamp. Reads never fail: a missing or unreadable
//! file falls back to 24 hours before now.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::error::{StoreError, StoreResult};
use crate::fs_utils::{read_to_string, write_atomic};

/// Default lookback when no watermark has been written yet.
pub const DEFAULT_LOOKBACK_HOURS: i64 = 24;

/// File-backed watermark.
#[derive(Debug, Clone)]
pub struct WatermarkStore {
    path: PathBuf,
}

impl WatermarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored watermark, if present and valid.
    pub async fn read(&self) -> StoreResult<DateTime<Utc>> {
        let raw = read_to_string(&self.path).await?;
        let value = raw.trim();
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| StoreError::InvalidWatermark {
                path: self.path.clone(),
                value: value.to_string(),
            })
    }

    /// Stored watermark, or now minus 24 hours.
    pub async fn load(&self) -> DateTime<Utc> {
        match self.read().await {
            Ok(at) => at,
            Err(e) => {
                if !e.is_not_found() {
                    warn!("Could not read last check time, using default lookback: {}", e);
                }
                Utc::now() - Duration::hours(DEFAULT_LOOKBACK_HOURS)
            }
        }
    }

    /// Overwrite the watermark.
    pub async fn save(&self, at: DateTime<Utc>) -> StoreResult<()> {
        let value = at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        write_atomic(&self.path, value.as_bytes()).await
    }
}
