use std::path::Path;

use chrono::Utc;
use rand::Rng;

/// Extracts the file extension from a filename and converts it to lowercase.
pub fn get_file_extension(filename: &str) -> Option<String> {
    Path::new(filename) // treats string as filesystem path.
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Reduces a user-supplied filename to the safe alphabet `[a-zA-Z0-9._-]`.
///
/// Leading/trailing whitespace is trimmed, inner whitespace becomes a hyphen,
/// any other character outside the alphabet is dropped, and runs of hyphens
/// collapse to a single one. The result may be empty; callers prefix a unique
/// token so the final name is never empty.
pub fn sanitize_filename(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.trim().chars() {
        let mapped = if c.is_ascii_alphanumeric() || matches!(c, '.' | '_') {
            Some(c)
        } else if c == '-' || c.is_whitespace() {
            Some('-')
        } else {
            None
        };
        if let Some(c) = mapped {
            if c == '-' && out.ends_with('-') {
                continue;
            }
            out.push(c);
        }
    }
    out
}

/// Builds a collision-resistant filename: `<unix-millis>-<random>-<base><ext>`.
///
/// The random component is drawn from `0..1e9`, so two concurrent requests
/// sharing a millisecond still get distinct names with overwhelming
/// probability. The sanitized base is omitted when it comes out empty.
pub fn unique_filename(original: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let token: u32 = rand::rng().random_range(0..1_000_000_000);

    let stem = Path::new(original)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let base = sanitize_filename(stem);
    let extension = get_file_extension(original)
        .map(|ext| format!(".{}", sanitize_filename(&ext)))
        .unwrap_or_default();

    if base.is_empty() {
        format!("{}-{}{}", millis, token, extension)
    } else {
        format!("{}-{}-{}{}", millis, token, base, extension)
    }
}

/// File size in megabytes, rounded to 3 decimals.
pub fn size_in_mb(size_bytes: u64) -> f64 {
    let mb = size_bytes as f64 / (1024.0 * 1024.0);
    (mb * 1000.0).round() / 1000.0
}
