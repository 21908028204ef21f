//! Single-record persistence: one JSON value per file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use tokio::fs;

use crate::storage::error::{StoreError, StoreResult};

/// Reads a record file and parses it as JSON.
///
/// A file that exists but does not hold JSON is reported as
/// [`StoreError::MalformedRecord`], never as an empty record.
pub async fn read(file_path: &Path) -> StoreResult<JsonValue> {
    let bytes = fs::read(file_path)
        .await
        .map_err(|e| StoreError::io(file_path, e))?;

    serde_json::from_slice(&bytes).map_err(|source| StoreError::MalformedRecord {
        path: file_path.to_path_buf(),
        source,
    })
}

/// Replaces the full content of a record file.
///
/// The document is written to a sibling temporary file first and then
/// renamed over the target, so concurrent readers see either the old or
/// the new record.
pub async fn write(file_path: &Path, document: &JsonValue) -> StoreResult<()> {
    let content = serde_json::to_vec(document)?;
    let tmp_path = temporary_sibling(file_path);

    tracing::debug!(path = %file_path.display(), bytes = content.len(), "writing record");

    if let Err(e) = fs::write(&tmp_path, &content).await {
        return Err(StoreError::io(&tmp_path, e));
    }
    if let Err(e) = fs::rename(&tmp_path, file_path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(StoreError::io(file_path, e));
    }
    Ok(())
}

/// Unlinks a record file.
pub async fn delete(file_path: &Path) -> StoreResult<()> {
    tracing::debug!(path = %file_path.display(), "deleting record");
    fs::remove_file(file_path)
        .await
        .map_err(|e| StoreError::io(file_path, e))
}

// `posts/3.json` -> `posts/3.json.tmp`; the suffix keeps it out of collection listings.
fn temporary_sibling(file_path: &Path) -> PathBuf {
    let mut name: OsString = file_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    file_path.with_file_name(name)
}
