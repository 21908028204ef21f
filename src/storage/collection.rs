//! Collection aggregation: every record file directly inside a directory.

use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use tokio::fs;

use crate::storage::document;
use crate::storage::error::{StoreError, StoreResult};

/// Lists the record files directly inside `dir_path`.
///
/// Only regular files whose name ends with `extension` are returned;
/// subdirectories are skipped. Order is whatever the directory listing
/// yields.
pub async fn list(dir_path: &Path, extension: &str) -> StoreResult<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir_path)
        .await
        .map_err(|e| StoreError::io(dir_path, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| StoreError::io(dir_path, e))?
    {
        let is_record_name = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(extension));
        if !is_record_name {
            continue;
        }

        let file_type = entry
            .file_type()
            .await
            .map_err(|e| StoreError::io(entry.path(), e))?;
        if file_type.is_file() {
            files.push(entry.path());
        }
    }

    Ok(files)
}

/// Reads every listed record, in order.
///
/// One unreadable or malformed member fails the whole aggregation; a
/// partial collection is never returned.
pub async fn aggregate(files: &[PathBuf]) -> StoreResult<Vec<JsonValue>> {
    let mut documents = Vec::with_capacity(files.len());
    for file in files {
        documents.push(document::read(file).await?);
    }
    Ok(documents)
}

/// `list` followed by `aggregate`.
pub async fn load(dir_path: &Path, extension: &str) -> StoreResult<Vec<JsonValue>> {
    let files = list(dir_path, extension).await?;
    aggregate(&files).await
}
