use async_trait::async_trait;
use axum::extract::multipart::Field;
use tracing::error;

use super::{UploadPayload, UploadSource};
use crate::{error::AppError, models::IncomingFile};

// Buffers each part fully in memory before handing it to the persister.
// Cheapest for small files; peak memory is bounded by the batch size.
#[derive(Clone)]
pub struct MemorySource;

#[async_trait]
impl UploadSource for MemorySource {
    async fn collect(&self, field: Field<'_>) -> Result<IncomingFile, AppError> {
        let original_filename = field.file_name().unwrap_or_default().to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let data = field.bytes().await.map_err(|e| {
            error!("Error reading file bytes: {}", e);
            AppError::MultipartError(format!("Failed to read the file: {}", e))
        })?;

        Ok(IncomingFile {
            original_filename,
            mime_type,
            size_bytes: data.len() as u64,
            payload: UploadPayload::Memory(data),
        })
    }
}
