use crate::error::{GitLogError, Result};
use chrono::{DateTime, Local};
use std::path::Path;

/// Lower-cased suffix of the file name including the dot, or empty.
pub fn extension_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// `YYYY-MM-DDTHH:MM:SS` in the local timezone.
pub fn local_iso_date(secs: i64) -> Result<String> {
    let utc = DateTime::from_timestamp(secs, 0).ok_or(GitLogError::InvalidTimestamp(secs))?;
    Ok(utc
        .with_timezone(&Local)
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string())
}
