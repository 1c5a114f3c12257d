// Submodules for the two upload buffering strategies
mod disk;
mod memory;

use async_trait::async_trait;
use axum::extract::multipart::Field;
use bytes::Bytes;
use tempfile::TempPath;
use tracing::info;

use crate::{
    config::{Config, UploadStrategy},
    error::AppError,
    models::IncomingFile,
    storage::{disk::DiskSource, memory::MemorySource},
};

/// Where an incoming file's bytes live before persistence.
///
/// A spooled payload deletes itself on drop unless persisted, so rejected
/// uploads leave nothing behind.
#[derive(Debug)]
pub enum UploadPayload {
    /// Buffered in memory by the boundary layer.
    Memory(Bytes),
    /// Already streamed to a temp file on the target filesystem.
    Spooled(TempPath),
}

// Async source trait: each strategy turns a multipart part into an
// `IncomingFile` with a uniform payload for the persister.
#[async_trait]
pub trait UploadSource: Send + Sync {
    /// Drain one multipart part and capture its metadata and bytes.
    async fn collect(&self, field: Field<'_>) -> Result<IncomingFile, AppError>;
}

// Enum to represent the configured source strategy
#[derive(Clone)]
pub enum SourceBackend {
    Memory(MemorySource),
    Disk(DiskSource),
}

// Implement UploadSource for SourceBackend enum
// Delegates calls to the chosen strategy
#[async_trait]
impl UploadSource for SourceBackend {
    async fn collect(&self, field: Field<'_>) -> Result<IncomingFile, AppError> {
        match self {
            SourceBackend::Memory(s) => s.collect(field).await,
            SourceBackend::Disk(s) => s.collect(field).await,
        }
    }
}

// Initialize the upload source based on config
pub async fn init_source(config: &Config) -> Result<SourceBackend, AppError> {
    match config.upload_strategy {
        UploadStrategy::Memory => {
            info!("Buffering uploads in memory");
            Ok(SourceBackend::Memory(MemorySource))
        }
        UploadStrategy::Disk => {
            info!("Spooling uploads to disk");
            Ok(SourceBackend::Disk(
                DiskSource::new(&config.upload_dir).await?,
            ))
        }
    }
}
