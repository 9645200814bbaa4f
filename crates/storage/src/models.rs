//! Storage models.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use time::{Duration, OffsetDateTime};

/// File metadata returned by storage backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Path as given to the backend
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified: OffsetDateTime,
    /// Whether the path points to a directory
    pub is_dir: bool,
}
impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: OffsetDateTime, is_dir: bool) -> Self {
        Self {
            path: path.into(),
            size,
            modified,
            is_dir,
        }
    }

    pub(crate) fn from_metadata(path: &Path, metadata: &Metadata) -> std::io::Result<Self> {
        let modified = metadata.modified()?.into();
        Ok(Self::new(path, metadata.len(), modified, metadata.is_dir()))
    }

    /// Time elapsed between the last modification and `now`. Negative when
    /// the modification time lies in the future.
    pub fn age(&self, now: OffsetDateTime) -> Duration {
        now - self.modified
    }
}

/// How a move was carried out by [`StorageBackend::move_file`](crate::StorageBackend::move_file).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMethod {
    /// Atomic rename within one filesystem.
    Renamed,
    /// Rename failed (different devices, usually), so the file was copied
    /// and the source deleted.
    Copied,
}
