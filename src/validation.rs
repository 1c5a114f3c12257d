use crate::error::AppError;

/// Decide whether an incoming file is acceptable.
///
/// The MIME allow-list check runs first, so a file that is both oversized
/// and of an unknown type is reported as `InvalidFileType`. Comparison is
/// case-insensitive and ignores MIME parameters (`; charset=...`).
pub fn validate_file(
    mime_type: &str,
    size_bytes: u64,
    max_size_bytes: u64,
    allowed_types: &[String],
) -> Result<(), AppError> {
    let normalized = mime_type.split(';').next().unwrap_or(mime_type).trim();

    if !allowed_types
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(normalized))
    {
        return Err(AppError::InvalidFileType(normalized.to_string()));
    }

    if size_bytes > max_size_bytes {
        return Err(AppError::FileTooLarge {
            size: size_bytes,
            max: max_size_bytes,
        });
    }

    Ok(())
}
