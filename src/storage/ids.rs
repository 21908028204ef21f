//! Record id allocation inside a collection directory.
//!
//! The number of entries in the directory seeds the probe: with no gaps it is
//! exactly the next free id. When the candidate is taken (deleted records left
//! a gap below it, or ids were assigned out of band) the probe walks upwards
//! until a free one is found. The result is always unused, not necessarily the
//! smallest unused id.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value as JsonValue;
use tokio::fs;

use crate::storage::error::{StoreError, StoreResult};

/// Field stamped onto created records.
pub const ID_FIELD: &str = "id";

/// Outcome of [`create_record`].
#[derive(Debug, Clone)]
pub struct CreatedRecord {
    pub id: u64,
    pub file_path: PathBuf,
    pub document: JsonValue,
}

/// Path of the record with the given id inside `dir_path`.
pub fn record_path(dir_path: &Path, id: u64, extension: &str) -> PathBuf {
    dir_path.join(format!("{id}{extension}"))
}

/// Number of entries (of any kind) directly inside `dir_path`.
pub async fn entry_count(dir_path: &Path) -> StoreResult<u64> {
    let mut entries = fs::read_dir(dir_path)
        .await
        .map_err(|e| StoreError::io(dir_path, e))?;

    let mut count = 0u64;
    while entries
        .next_entry()
        .await
        .map_err(|e| StoreError::io(dir_path, e))?
        .is_some()
    {
        count += 1;
    }
    Ok(count)
}

/// First id at or above the entry count whose record file does not exist yet.
///
/// This only probes; nothing is reserved. Use [`create_record`] to allocate
/// and persist in one step.
pub async fn next_free_id(dir_path: &Path, extension: &str) -> StoreResult<u64> {
    let mut id = entry_count(dir_path).await?;
    loop {
        let candidate = record_path(dir_path, id, extension);
        match fs::try_exists(&candidate).await {
            Ok(false) => return Ok(id),
            Ok(true) => id += 1,
            Err(e) => return Err(StoreError::io(candidate, e)),
        }
    }
}

/// Sets `id` on an object document. Other JSON values are stored as they are.
pub fn stamp_id(document: &mut JsonValue, id: u64) {
    if let JsonValue::Object(map) = document {
        map.insert(ID_FIELD.to_string(), JsonValue::from(id));
    }
}

/// Allocates an id, stamps it onto `document` and persists the record.
///
/// The stamped record is written to a private temporary file first and then
/// hard-linked to the candidate name. The link either fails with
/// `AlreadyExists` (the id is taken; try the next one) or publishes the
/// complete record in one step. Two writers racing on the same directory can
/// never share an id, and a create abandoned part-way never leaves an empty
/// or truncated record behind.
pub async fn create_record(
    dir_path: &Path,
    extension: &str,
    mut document: JsonValue,
) -> StoreResult<CreatedRecord> {
    let mut id = entry_count(dir_path).await?;
    let staging = StagingFile::new(dir_path);

    loop {
        stamp_id(&mut document, id);
        let content = serde_json::to_vec(&document)?;
        fs::write(&staging.path, &content)
            .await
            .map_err(|e| StoreError::io(&staging.path, e))?;

        let file_path = record_path(dir_path, id, extension);
        match fs::hard_link(&staging.path, &file_path).await {
            Ok(()) => {
                return Ok(CreatedRecord {
                    id,
                    file_path,
                    document,
                })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                tracing::trace!(id, path = %file_path.display(), "id taken, probing next");
                id += 1;
            }
            Err(e) => return Err(StoreError::io(file_path, e)),
        }
    }
}

static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Uniquely named scratch file inside a collection; removed on drop.
///
/// The `.tmp` suffix keeps it out of collection listings.
struct StagingFile {
    path: PathBuf,
}

impl StagingFile {
    fn new(dir_path: &Path) -> Self {
        let n = STAGING_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self {
            path: dir_path.join(format!(".create-{}-{}.tmp", std::process::id(), n)),
        }
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        // Also runs when the create is cancelled, so it cannot await.
        let _ = std::fs::remove_file(&self.path);
    }
}
