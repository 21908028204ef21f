//! Per-path single-writer locks.
//!
//! Every mutation of a record (or, for POST, of a collection directory) runs
//! while holding the lock for that path, so a read-modify-write such as PATCH
//! cannot interleave with another writer inside this process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::OwnedMutexGuard;

type LockMap = HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>;

#[derive(Default)]
pub struct PathLocks {
    locks: Mutex<LockMap>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `path`. Released when the guard drops.
    pub async fn lock(&self, path: &Path) -> PathGuard<'_> {
        let lock = self
            .map()
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone();

        PathGuard {
            guard: Some(lock.lock_owned().await),
            locks: self,
            path: path.to_path_buf(),
        }
    }

    /// Number of paths currently held or waited on.
    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn map(&self) -> MutexGuard<'_, LockMap> {
        self.locks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Exclusive access to one path. Dropping the last holder removes the entry.
pub struct PathGuard<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a PathLocks,
    path: PathBuf,
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        // Release first so our own reference no longer counts.
        drop(self.guard.take());

        let mut map = self.locks.map();
        // Waiters clone the Arc under the map lock, so a count of one means
        // nobody else holds or awaits this path.
        if map
            .get(&self.path)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            map.remove(&self.path);
        }
    }
}
