use axum::{Json, extract::{Multipart, State}};
use futures::future;
use tracing::{error, info};

use crate::{
    error::AppError,
    models::{IncomingFile, UploadResponse},
    persist::persist_file,
    state::AppState,
    storage::UploadSource,
    validation::validate_file,
};

/// Upload one or more files using multipart/form-data (field `file`).
///
/// The first file that fails validation aborts the whole request before
/// anything is written.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let files =
        collect_files(&state, &mut multipart, "file", state.config.max_files_single).await?;

    if files.is_empty() {
        return Err(AppError::NoFileProvided("File not uploaded".into()));
    }

    validate_all(&state, &files)?;

    let persisted = future::try_join_all(
        files
            .into_iter()
            .map(|file| persist_file(file, &state.config.upload_dir)),
    )
    .await?;

    info!("Uploaded {} file(s)", persisted.len());

    Ok(Json(UploadResponse::uploaded(
        "Uploaded successfully",
        persisted,
        None,
    )))
}

/// Upload a larger set of files (field `files`), processed in fixed-size
/// batches: concurrent within a batch, batches strictly one after another.
pub async fn upload_bulk(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut files =
        collect_files(&state, &mut multipart, "files", state.config.max_files_bulk).await?;

    if files.is_empty() {
        return Err(AppError::NoFileProvided("No files uploaded".into()));
    }

    validate_all(&state, &files)?;

    let total_files = files.len();
    let mut persisted = Vec::with_capacity(total_files);

    while !files.is_empty() {
        let batch = next_batch(&mut files, state.config.bulk_batch_size);
        let records = future::try_join_all(
            batch
                .into_iter()
                .map(|file| persist_file(file, &state.config.upload_dir)),
        )
        .await
        .map_err(|e| AppError::BulkBatchFailed(Box::new(e)))?;
        persisted.extend(records);
    }

    info!("Bulk upload stored {} files", total_files);

    Ok(Json(UploadResponse::uploaded(
        "Bulk upload successful",
        persisted,
        Some(total_files),
    )))
}

/// Drain every part named `field_name` through the configured source.
async fn collect_files(
    state: &AppState,
    multipart: &mut Multipart,
    field_name: &str,
    max_files: usize,
) -> Result<Vec<IncomingFile>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Error parsing multipart: {}", e);
        AppError::MultipartError(format!("Failed to parse multipart form: {}", e))
    })? {
        // Ignore form fields that are not the expected file part
        if field.name() != Some(field_name) || field.file_name().is_none() {
            continue;
        }

        if files.len() >= max_files {
            return Err(AppError::TooManyFiles {
                count: files.len() + 1,
                max: max_files,
            });
        }

        files.push(state.source.collect(field).await?);
    }

    Ok(files)
}

fn validate_all(state: &AppState, files: &[IncomingFile]) -> Result<(), AppError> {
    for file in files {
        validate_file(
            &file.mime_type,
            file.size_bytes,
            state.config.max_file_size,
            &state.config.allowed_mime_types,
        )
        .inspect_err(|e| {
            error!("Rejected {:?}: {}", file.original_filename, e);
        })?;
    }
    Ok(())
}

/// Take up to `batch_size` files off the front of the queue.
fn next_batch(files: &mut Vec<IncomingFile>, batch_size: usize) -> Vec<IncomingFile> {
    let take = batch_size.max(1).min(files.len());
    files.drain(..take).collect()
}
