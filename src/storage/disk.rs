use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::extract::multipart::Field;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::error;

use super::{UploadPayload, UploadSource};
use crate::{dirs, error::AppError, models::IncomingFile};

// Streams each part chunk-by-chunk into a temp file under the spool
// directory. The spool lives inside the upload directory so the final
// rename never crosses a filesystem boundary.
#[derive(Clone)]
pub struct DiskSource {
    spool_dir: PathBuf,
}

impl DiskSource {
    pub async fn new(upload_dir: &Path) -> Result<Self, AppError> {
        let spool_dir = upload_dir.join(".spool");
        dirs::ensure_dir(&spool_dir).await?;
        Ok(Self { spool_dir })
    }
}

#[async_trait]
impl UploadSource for DiskSource {
    async fn collect(&self, mut field: Field<'_>) -> Result<IncomingFile, AppError> {
        let original_filename = field.file_name().unwrap_or_default().to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let spool = NamedTempFile::new_in(&self.spool_dir).map_err(AppError::WriteFailed)?;
        let (file, temp_path) = spool.into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let mut size_bytes: u64 = 0;
        while let Some(chunk) = field.chunk().await.map_err(|e| {
            error!("Error reading file chunk: {}", e);
            AppError::MultipartError(format!("Failed to read the file: {}", e))
        })? {
            size_bytes += chunk.len() as u64;
            file.write_all(&chunk).await.map_err(AppError::WriteFailed)?;
        }
        file.flush().await.map_err(AppError::WriteFailed)?;

        Ok(IncomingFile {
            original_filename,
            mime_type,
            size_bytes,
            payload: UploadPayload::Spooled(temp_path),
        })
    }
}
