//! URL path to filesystem path mapping.
//!
//! A URL path such as `/posts/3` names two candidates under the entry root:
//! the record file `<root>/posts/3.json` and the collection directory
//! `<root>/posts/3`. Resolution itself is pure; [`ResolvedPath::kind`] is the
//! one place that asks the filesystem which of the two exists.

use std::path::{Path, PathBuf};

use tokio::fs;

/// What a resolved path currently points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Candidate collection directory.
    pub dir_path: PathBuf,
    /// Candidate record file. The entry root itself has no record form.
    pub file_path: Option<PathBuf>,
}

impl ResolvedPath {
    /// Checks the record form first, then the collection form.
    pub async fn kind(&self) -> PathKind {
        if let Some(file_path) = &self.file_path {
            if is_file(file_path).await {
                return PathKind::File;
            }
        }
        match fs::metadata(&self.dir_path).await {
            Ok(meta) if meta.is_dir() => PathKind::Directory,
            _ => PathKind::Absent,
        }
    }

    /// The record file, if it exists right now.
    pub async fn existing_file(&self) -> Option<&Path> {
        let file_path = self.file_path.as_deref()?;
        is_file(file_path).await.then_some(file_path)
    }
}

/// Maps `url_path` under `root`.
///
/// Returns `None` when a segment is `.` or `..`: such paths would escape or
/// alias the entry root and are treated as naming nothing. Empty segments
/// (`/a//b`, a trailing `/`) are ignored.
pub fn resolve(root: &Path, url_path: &str, extension: &str) -> Option<ResolvedPath> {
    let segments: Vec<&str> = url_path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.iter().any(|s| *s == "." || *s == "..") {
        return None;
    }

    let mut dir_path = root.to_path_buf();
    dir_path.extend(&segments);

    let file_path = segments.split_last().map(|(last, parents)| {
        let mut file_path = root.to_path_buf();
        file_path.extend(parents);
        file_path.push(format!("{last}{extension}"));
        file_path
    });

    Some(ResolvedPath {
        dir_path,
        file_path,
    })
}

/// Canonical form of a GET path that ends in `/`.
///
/// Collections are always addressed without the trailing slash, so
/// `/posts/` redirects to `/posts`. The bare root `/` is already canonical.
pub fn redirect_target(url_path: &str) -> Option<&str> {
    if url_path.len() > 1 && url_path.ends_with('/') {
        Some(&url_path[..url_path.len() - 1])
    } else {
        None
    }
}

async fn is_file(path: &Path) -> bool {
    matches!(fs::metadata(path).await, Ok(meta) if meta.is_file())
}
