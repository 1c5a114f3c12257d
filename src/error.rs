use axum::{Json,
    http::StatusCode,
    response::IntoResponse
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NoFileProvided(String),

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("File size larger than limit! ({size} > {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Too many files: {count} exceeds the limit of {max}")]
    TooManyFiles { count: usize, max: usize },

    #[error("Multipart error: {0}")]
    MultipartError(String),

    #[error("Bulk upload failed")]
    BulkBatchFailed(#[source] Box<AppError>),

    #[error("Failed to create directory")]
    DirectoryCreationFailed(#[source] std::io::Error),

    #[error("Failed to write file")]
    WriteFailed(#[source] std::io::Error),

    #[error("Too many requests")]
    TooManyRequests,
}

/// Convert `AppError` into an HTTP response.
///
/// Validation errors keep their descriptive message; I/O errors are logged
/// with full detail and surfaced to the client as a generic failure.
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match &self {
            AppError::NoFileProvided(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidFileType(_)
            | AppError::FileTooLarge { .. }
            | AppError::TooManyFiles { .. }
            | AppError::MultipartError(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::BulkBatchFailed(cause) => {
                tracing::error!("Bulk upload failed: {:?}", cause);
                (StatusCode::BAD_REQUEST, "Bulk upload failed".to_string())
            }
            AppError::DirectoryCreationFailed(err) => {
                tracing::error!("Failed to create directory: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to store file".to_string(),
                )
            }
            AppError::WriteFailed(err) => {
                tracing::error!("Failed to write file: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to store file".to_string(),
                )
            }
            AppError::TooManyRequests => {
                (StatusCode::TOO_MANY_REQUESTS, "Too many requests".to_string())
            }
        };

        // Return standardized JSON error response
        let body = Json(json!({
            "success": false,
            "message": error_message,
            "error": error_message,
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_bad_request() {
        let res = AppError::InvalidFileType("application/zip".into()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = AppError::FileTooLarge { size: 10, max: 5 }.into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = AppError::NoFileProvided("No files uploaded".into()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn io_errors_map_to_internal_server_error() {
        let io = std::io::Error::other("disk full");
        let res = AppError::WriteFailed(io).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bulk_failure_hides_the_inner_cause() {
        let inner = AppError::WriteFailed(std::io::Error::other("disk full"));
        let err = AppError::BulkBatchFailed(Box::new(inner));
        assert_eq!(err.to_string(), "Bulk upload failed");
    }
}
