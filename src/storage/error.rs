//! Failures raised by the on-disk record storage.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Read, write, unlink, mkdir or listdir failed.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file exists but its content is not a JSON value.
    #[error("{}: invalid JSON ({source})", .path.display())]
    MalformedRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Filesystem path the failure is about, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            StoreError::Io { path, .. } | StoreError::MalformedRecord { path, .. } => Some(path),
            StoreError::Serialize(_) => None,
        }
    }
}
