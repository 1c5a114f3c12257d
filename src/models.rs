use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::UploadPayload;

/// A single multipart part as handed over by the boundary layer.
///
/// Exists only for the duration of request handling; the payload is either
/// buffered in memory or already spooled to a temp file, depending on the
/// configured upload strategy.
#[derive(Debug)]
pub struct IncomingFile {
    pub original_filename: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub payload: UploadPayload,
}

/// Metadata of a file durably written under its final name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedFile {
    pub path: String,
    pub filename: String,
    pub original_filename: String,
    pub extension: String,
    /// Size in megabytes, rounded to 3 decimals.
    pub size: f64,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub success_code: u16,
    pub error: Option<String>,
    pub files: Vec<PersistedFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_files: Option<usize>,
}

impl UploadResponse {
    pub fn uploaded(
        message: impl Into<String>,
        files: Vec<PersistedFile>,
        total_files: Option<usize>,
    ) -> Self {
        Self {
            success: true,
            message: message.into(),
            success_code: 200,
            error: None,
            files,
            total_files,
        }
    }
}
