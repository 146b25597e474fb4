//! Filesystem utilities for whole-file rewrites.
//!
//! State files are replaced in full on every write. Content goes to a
//! sibling temp file first and is then renamed over the destination, so a
//! crash mid-write leaves either the old or the new file, never a torn one.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{StoreError, StoreResult};

/// Temp path used while rewriting `dst`.
fn temp_path(dst: &Path) -> PathBuf {
    let mut name = dst
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    dst.with_file_name(name)
}

/// Atomically replace `dst` with `contents`.
///
/// Creates the parent directory when missing. The temp file is synced
/// before the rename.
pub async fn write_atomic(dst: impl AsRef<Path>, contents: &[u8]) -> StoreResult<()> {
    let dst = dst.as_ref();

    if let Some(parent) = dst.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::write(parent, e))?;
        }
    }

    let tmp = temp_path(dst);
    let mut file = fs::File::create(&tmp)
        .await
        .map_err(|e| StoreError::write(&tmp, e))?;
    file.write_all(contents)
        .await
        .map_err(|e| StoreError::write(&tmp, e))?;
    file.sync_all()
        .await
        .map_err(|e| StoreError::write(&tmp, e))?;
    drop(file);

    if let Err(e) = fs::rename(&tmp, dst).await {
        let _ = fs::remove_file(&tmp).await;
        tracing::error!(
            "Failed to rename temp file into place: {} -> {}: {}",
            tmp.display(),
            dst.display(),
            e
        );
        return Err(StoreError::write(dst, e));
    }

    Ok(())
}

/// Read a file to a string, mapping errors to [`StoreError::Read`].
pub async fn read_to_string(path: impl AsRef<Path>) -> StoreResult<String> {
    let path = path.as_ref();
    fs::read_to_string(path)
        .await
        .map_err(|e| StoreError::read(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_atomic_creates_parent() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("nested").join("state.json");

        write_atomic(&dst, b"[]").await.unwrap();

        assert_eq!(fs::read_to_string(&dst).await.unwrap(), "[]");
        assert!(!temp_path(&dst).exists(), "temp file should be renamed away");
    }

    #[tokio::test]
    async fn test_write_atomic_overwrites() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("state.json");

        write_atomic(&dst, b"old content").await.unwrap();
        write_atomic(&dst, b"new").await.unwrap();

        assert_eq!(fs::read_to_string(&dst).await.unwrap(), "new");
    }

    #[tokio::test]
    async fn test_read_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = read_to_string(dir.path().join("missing")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let tmp = temp_path(Path::new("data/processed.json"));
        assert_eq!(tmp, PathBuf::from("data/processed.json.tmp"));
    }
}
