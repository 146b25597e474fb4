//! Durable set of processed videos.
//!
//! The store is a JSON array of [`ProcessedRecord`] kept in insertion order.
//! Every insert rewrites the whole file before returning.
//!
//! Failure semantics:
//! - a missing file is an empty store, persisted immediately
//! - an unreadable or corrupt file is logged and treated as empty
//! - a failed save is reported to the caller, but the in-memory insert
//!   stays; the record survives for the process lifetime only

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};
use ytdigest_models::{ProcessedRecord, VideoId};

use crate::error::{StoreError, StoreResult};
use crate::fs_utils::{read_to_string, write_atomic};

/// File-backed dedup store.
#[derive(Debug)]
pub struct DedupStore {
    path: PathBuf,
    records: Vec<ProcessedRecord>,
    ids: HashSet<VideoId>,
}

impl DedupStore {
    /// Load the store from `path`, failing open.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let records = match Self::read_records(&path).await {
            Ok(records) => records,
            Err(e) if e.is_not_found() => {
                info!(path = %path.display(), "No dedup store yet, creating an empty one");
                let store = Self::from_records(path, Vec::new());
                if let Err(e) = store.save().await {
                    error!("Failed to save database: {}", e);
                }
                return store;
            }
            Err(e) => {
                error!("Database load failed: {}", e);
                Vec::new()
            }
        };

        debug!(
            path = %path.display(),
            count = records.len(),
            "Loaded processed videos"
        );
        Self::from_records(path, records)
    }

    fn from_records(path: PathBuf, records: Vec<ProcessedRecord>) -> Self {
        let mut ids = HashSet::with_capacity(records.len());
        let mut unique = Vec::with_capacity(records.len());
        for record in records {
            if ids.insert(record.video_id.clone()) {
                unique.push(record);
            }
        }
        Self {
            path,
            records: unique,
            ids,
        }
    }

    async fn read_records(path: &Path) -> StoreResult<Vec<ProcessedRecord>> {
        let data = read_to_string(path).await?;
        serde_json::from_str(&data).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    /// True iff a record with this id exists.
    pub fn is_processed(&self, video_id: &VideoId) -> bool {
        self.ids.contains(video_id)
    }

    /// Insert a record for `video_id` unless one already exists.
    ///
    /// Returns `Ok(true)` when a record was inserted and persisted,
    /// `Ok(false)` when the id was already present. On a save failure the
    /// record is kept in memory and the error is returned.
    pub async fn mark_processed(&mut self, video_id: &VideoId, title: &str) -> StoreResult<bool> {
        if self.ids.contains(video_id) {
            debug!(video_id = %video_id, "Already marked processed");
            return Ok(false);
        }

        self.ids.insert(video_id.clone());
        self.records
            .push(ProcessedRecord::now(video_id.clone(), title));

        if let Err(e) = self.save().await {
            error!(video_id = %video_id, "Failed to save database: {}", e);
            return Err(e);
        }
        Ok(true)
    }

    /// Full identifier set.
    pub fn get_all_processed(&self) -> HashSet<VideoId> {
        self.ids.clone()
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[ProcessedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn save(&self) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(&self.records)?;
        write_atomic(&self.path, &json).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_creates_empty_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed.json");

        let store = DedupStore::load(&path).await;

        assert!(store.is_empty());
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_mark_processed_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed.json");
        let id = VideoId::from("dQw4w9WgXcQ");

        let mut store = DedupStore::load(&path).await;
        assert!(store.mark_processed(&id, "First").await.unwrap());
        assert!(!store.mark_processed(&id, "Second").await.unwrap());

        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].title, "First");

        let reloaded = DedupStore::load(&path).await;
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.is_processed(&id));
    }

    #[tokio::test]
    async fn test_records_keep_insertion_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed.json");

        let mut store = DedupStore::load(&path).await;
        for id in ["ccccccccccc", "aaaaaaaaaaa", "bbbbbbbbbbb"] {
            store.mark_processed(&VideoId::from(id), id).await.unwrap();
        }

        let reloaded = DedupStore::load(&path).await;
        let ids: Vec<&str> = reloaded.records().iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(ids, vec!["ccccccccccc", "aaaaaaaaaaa", "bbbbbbbbbbb"]);
        assert_eq!(reloaded.get_all_processed().len(), 3);
    }

    #[tokio::test]
    async fn test_corrupt_file_fails_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = DedupStore::load(&path).await;

        assert!(store.is_empty());
        // The corrupt file is left alone until the next insert.
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "{not json");
    }

    #[tokio::test]
    async fn test_duplicate_ids_on_disk_collapse() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("processed.json");
        let json = r#"[
            {"videoId":"aaaaaaaaaaa","title":"one","processedAt":"2024-01-01T00:00:00Z"},
            {"videoId":"aaaaaaaaaaa","title":"dup","processedAt":"2024-01-02T00:00:00Z"}
        ]"#;
        tokio::fs::write(&path, json).await.unwrap();

        let store = DedupStore::load(&path).await;

        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].title, "one");
    }

    #[tokio::test]
    async fn test_save_failure_keeps_in_memory_record() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes every write fail.
        let path = dir.path().join("processed.json");
        tokio::fs::create_dir(&path).await.unwrap();

        let mut store = DedupStore::load(&path).await;
        let id = VideoId::from("dQw4w9WgXcQ");

        let result = store.mark_processed(&id, "title").await;

        assert!(result.is_err());
        assert!(store.is_processed(&id));
        assert!(!store.mark_processed(&id, "title").await.unwrap());
    }
}
