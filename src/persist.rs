use std::path::Path;

use chrono::Utc;
use tempfile::{NamedTempFile, TempPath};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::{
    dirs,
    error::AppError,
    models::{IncomingFile, PersistedFile},
    storage::UploadPayload,
    utils::{get_file_extension, size_in_mb, unique_filename},
};

/// Durably write an incoming file under a collision-resistant name.
///
/// Bytes always reach the final path through a rename of a temp file on the
/// same filesystem: either the final path holds the complete payload, or it
/// does not exist.
pub async fn persist_file(file: IncomingFile, target_dir: &Path) -> Result<PersistedFile, AppError> {
    dirs::ensure_dir(target_dir).await?;

    let filename = unique_filename(&file.original_filename);
    let final_path = target_dir.join(&filename);

    let staged = match file.payload {
        // Memory payloads are staged through a temp file in the target
        // directory first, then renamed into place.
        UploadPayload::Memory(bytes) => stage_bytes(target_dir, &bytes).await?,
        // Spooled payloads were already written next to the target
        // directory by the boundary layer.
        UploadPayload::Spooled(temp_path) => temp_path,
    };

    staged
        .persist(&final_path)
        .map_err(|e| AppError::WriteFailed(e.error))?;

    info!("Stored file at {:?}", final_path);

    Ok(PersistedFile {
        path: final_path.to_string_lossy().into_owned(),
        filename,
        extension: get_file_extension(&file.original_filename).unwrap_or_default(),
        original_filename: file.original_filename,
        size: size_in_mb(file.size_bytes),
        uploaded_at: Utc::now(),
    })
}

/// Write a memory payload to a fresh temp file in `dir`.
async fn stage_bytes(dir: &Path, bytes: &[u8]) -> Result<TempPath, AppError> {
    let staged = NamedTempFile::new_in(dir).map_err(AppError::WriteFailed)?;
    let (file, temp_path) = staged.into_parts();
    let mut file = tokio::fs::File::from_std(file);

    file.write_all(bytes).await.map_err(AppError::WriteFailed)?;
    file.flush().await.map_err(AppError::WriteFailed)?;

    Ok(temp_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn memory_file(name: &str, mime: &str, data: &[u8]) -> IncomingFile {
        IncomingFile {
            original_filename: name.to_string(),
            mime_type: mime.to_string(),
            size_bytes: data.len() as u64,
            payload: UploadPayload::Memory(Bytes::copy_from_slice(data)),
        }
    }

    #[tokio::test]
    async fn memory_payload_lands_with_complete_bytes() {
        let dir = TempDir::new().unwrap();
        let data = vec![42u8; 1024];

        let record = persist_file(memory_file("Holiday Photo.PNG", "image/png", &data), dir.path())
            .await
            .unwrap();

        assert!(record.filename.ends_with("-Holiday-Photo.png"));
        assert_eq!(record.extension, "png");
        assert_eq!(record.original_filename, "Holiday Photo.PNG");
        assert_eq!(std::fs::read(dir.path().join(&record.filename)).unwrap(), data);
    }

    #[tokio::test]
    async fn spooled_payload_is_renamed_into_place() {
        let dir = TempDir::new().unwrap();
        let data = b"%PDF-1.7 pretend".to_vec();

        let spool = NamedTempFile::new_in(dir.path()).unwrap();
        std::fs::write(spool.path(), &data).unwrap();
        let spool_path = spool.path().to_path_buf();

        let file = IncomingFile {
            original_filename: "report.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size_bytes: data.len() as u64,
            payload: UploadPayload::Spooled(spool.into_temp_path()),
        };

        let record = persist_file(file, dir.path()).await.unwrap();

        assert!(!spool_path.exists());
        assert_eq!(std::fs::read(dir.path().join(&record.filename)).unwrap(), data);
    }

    #[tokio::test]
    async fn identical_original_names_get_distinct_files() {
        let dir = TempDir::new().unwrap();

        let mut names = HashSet::new();
        for _ in 0..100 {
            let record = persist_file(memory_file("dup.png", "image/png", b"png"), dir.path())
                .await
                .unwrap();
            names.insert(record.filename);
        }

        assert_eq!(names.len(), 100);
        let on_disk = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(on_disk, 100);
    }

    #[tokio::test]
    async fn creates_the_target_directory_when_missing() {
        let root = TempDir::new().unwrap();
        let target = root.path().join("fresh/uploads");

        let record = persist_file(memory_file("a.webp", "image/webp", b"x"), &target)
            .await
            .unwrap();

        assert!(target.join(&record.filename).is_file());
    }

    #[tokio::test]
    async fn size_is_reported_in_megabytes() {
        let dir = TempDir::new().unwrap();
        let data = vec![0u8; 2 * 1024 * 1024];

        let record = persist_file(memory_file("big.png", "image/png", &data), dir.path())
            .await
            .unwrap();

        assert_eq!(record.size, 2.0);
    }
}
