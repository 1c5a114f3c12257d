use std::collections::HashSet;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use tokio::{fs, sync::Mutex};

use crate::error::AppError;

// Paths known to exist, keyed by absolute path. Advisory only: the check
// below must stay correct when this set is empty (fresh process, racing
// workers), which `create_dir_all` guarantees.
static KNOWN_DIRS: Lazy<Mutex<HashSet<PathBuf>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Ensure `path` exists, creating it and any missing ancestors.
///
/// "Already exists" is success, including when a concurrent request creates
/// the directory first. Repeat calls for the same path skip the filesystem.
pub async fn ensure_dir(path: &Path) -> Result<(), AppError> {
    let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    if KNOWN_DIRS.lock().await.contains(&key) {
        return Ok(());
    }

    fs::create_dir_all(path).await.map_err(|e| {
        tracing::error!("Failed to create directory {:?}: {}", path, e);
        AppError::DirectoryCreationFailed(e)
    })?;

    KNOWN_DIRS.lock().await.insert(key);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn creates_missing_ancestors() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("a/b/c");

        ensure_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn repeat_calls_are_idempotent() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("uploads");

        ensure_dir(&dir).await.unwrap();
        let marker = dir.join("marker");
        std::fs::write(&marker, b"x").unwrap();

        // Second call must succeed and leave the contents untouched.
        ensure_dir(&dir).await.unwrap();
        assert!(marker.is_file());
    }

    #[tokio::test]
    async fn existing_directory_is_success_even_without_memo() {
        let root = TempDir::new().unwrap();
        // Created behind the memo's back, as another worker process would.
        let dir = root.path().join("shared");
        std::fs::create_dir_all(&dir).unwrap();

        ensure_dir(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_calls_for_the_same_path_all_succeed() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("contended");

        let results = futures::future::join_all((0..8).map(|_| ensure_dir(&dir))).await;
        assert!(results.into_iter().all(|r| r.is_ok()));
        assert!(dir.is_dir());
    }
}
