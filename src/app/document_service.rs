//! The document service.
//!
//! Sits between the HTTP dispatcher and the storage modules. It owns the entry
//! root and the per-path writer locks; everything else lives on disk. Mutating
//! operations re-check record existence after taking the lock, and report an
//! absent record as `Ok(None)` so the caller can answer 404.

use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use tokio::fs;

use crate::app::path_locks::PathLocks;
use crate::domain::merge::shallow_merge;
use crate::domain::resolver::{self, ResolvedPath};
use crate::storage::{collection, document, ids};
use crate::storage::{CreatedRecord, StoreError, StoreResult, RECORD_EXTENSION};

pub struct DocumentService {
    root: PathBuf,
    locks: PathLocks,
}

impl DocumentService {
    /// Creates a service over an existing, already validated entry root.
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            locks: PathLocks::new(),
        }
    }

    pub fn resolve(&self, url_path: &str) -> Option<ResolvedPath> {
        resolver::resolve(&self.root, url_path, RECORD_EXTENSION)
    }

    pub async fn read_record(&self, file_path: &Path) -> StoreResult<JsonValue> {
        document::read(file_path).await
    }

    pub async fn read_collection(&self, dir_path: &Path) -> StoreResult<Vec<JsonValue>> {
        collection::load(dir_path, RECORD_EXTENSION).await
    }

    /// Creates a record in the collection at `dir_path`, creating the
    /// directory and any missing parents first.
    pub async fn create_record(&self, dir_path: &Path, body: JsonValue) -> StoreResult<CreatedRecord> {
        let _guard = self.locks.lock(dir_path).await;

        fs::create_dir_all(dir_path)
            .await
            .map_err(|e| StoreError::io(dir_path, e))?;

        let created = ids::create_record(dir_path, RECORD_EXTENSION, body).await?;
        tracing::debug!(id = created.id, path = %created.file_path.display(), "record created");
        Ok(created)
    }

    /// Replaces an existing record wholesale.
    pub async fn replace_record(
        &self,
        resolved: &ResolvedPath,
        body: JsonValue,
    ) -> StoreResult<Option<JsonValue>> {
        let Some(file_path) = resolved.file_path.as_deref() else {
            return Ok(None);
        };
        let _guard = self.locks.lock(file_path).await;
        if resolved.existing_file().await.is_none() {
            return Ok(None);
        }

        document::write(file_path, &body).await?;
        Ok(Some(body))
    }

    /// Shallow-merges `patch` onto an existing record.
    pub async fn merge_record(
        &self,
        resolved: &ResolvedPath,
        patch: JsonValue,
    ) -> StoreResult<Option<JsonValue>> {
        let Some(file_path) = resolved.file_path.as_deref() else {
            return Ok(None);
        };
        let _guard = self.locks.lock(file_path).await;
        if resolved.existing_file().await.is_none() {
            return Ok(None);
        }

        let stored = document::read(file_path).await?;
        let merged = shallow_merge(stored, patch);
        document::write(file_path, &merged).await?;
        Ok(Some(merged))
    }

    /// Unlinks an existing record. Returns the removed file's path.
    pub async fn delete_record(&self, resolved: &ResolvedPath) -> StoreResult<Option<PathBuf>> {
        let Some(file_path) = resolved.file_path.as_deref() else {
            return Ok(None);
        };
        let _guard = self.locks.lock(file_path).await;
        if resolved.existing_file().await.is_none() {
            return Ok(None);
        }

        document::delete(file_path).await?;
        Ok(Some(file_path.to_path_buf()))
    }
}
