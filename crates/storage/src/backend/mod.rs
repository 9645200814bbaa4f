//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, the single seam between
//! the jobs and the filesystem. Jobs never touch `std::fs`/`tokio::fs`
//! directly, so the same pipeline can run against the real filesystem, a
//! dry-run decorator, or an instrumented test double.

mod local;
mod ro;

pub use self::local::LocalBackend;
pub use self::ro::ReadOnlyBackend;
use crate::error::Result;
use crate::models::{FileInfo, MoveMethod};
use async_trait::async_trait;
use keeper_compress::Compression;
use std::path::{Path, PathBuf};

/// Unified interface for filesystem operations used by the jobs.
///
/// All operations are asynchronous. Paths are used as given (absolute or
/// relative to the working directory); callers are expected to build
/// destination paths from [validated](crate::validate_file_name) base names.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use keeper_storage::{StorageBackend, error::Result};
///
/// async fn total_size(backend: &dyn StorageBackend, dir: &Path) -> Result<u64> {
///     let mut total = 0;
///     for path in backend.glob(dir, "*.log").await? {
///         total += backend.stat(&path).await?.size;
///     }
///     Ok(total)
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the backend, used for logging only.
    fn name(&self) -> &str;

    /// Expand a glob `pattern` relative to `dir`.
    ///
    /// Wildcards never cross a path separator. Matches are returned sorted
    /// by name within each directory. No matches is an empty list, not an
    /// error; only a malformed pattern returns
    /// [`InvalidPattern`](crate::error::ErrorKind::InvalidPattern).
    async fn glob(&self, dir: &Path, pattern: &str) -> Result<Vec<PathBuf>>;

    /// Get file metadata without reading contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the path
    /// does not exist.
    async fn stat(&self, path: &Path) -> Result<FileInfo>;

    /// Create a directory and all of its missing parents.
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Compress `source` into a single-entry zip archive at `target`,
    /// overwriting any existing archive. Returns the number of uncompressed
    /// bytes read from `source`.
    ///
    /// # Notes
    /// - The parent directory of `target` must already exist.
    /// - The entry inside the archive is named after the base name of `source`.
    async fn archive(&self, source: &Path, target: &Path, compression: Compression) -> Result<u64>;

    /// Copy `from` to `to`, creating parent directories as needed and
    /// syncing the destination before returning. Returns the number of
    /// bytes copied.
    async fn copy(&self, from: &Path, to: &Path) -> Result<u64>;

    /// Rename a file. Fails when `from` and `to` are on different devices.
    async fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Delete a file.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn delete(&self, path: &Path) -> Result<()>;

    /// Move a file, creating parent directories of `to` as needed.
    ///
    /// Tries an atomic [`rename`](Self::rename) first. If that fails, falls
    /// back to [`copy`](Self::copy) followed by [`delete`](Self::delete) of
    /// the source. If the copy fails the source is left untouched; if the
    /// delete fails the error is returned and both copies exist.
    async fn move_file(&self, from: &Path, to: &Path) -> Result<MoveMethod> {
        if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.create_dir_all(parent).await?;
        }
        match self.rename(from, to).await {
            Ok(()) => Ok(MoveMethod::Renamed),
            Err(err) => {
                tracing::debug!(
                    backend = self.name(),
                    from = %from.display(),
                    to = %to.display(),
                    error = %err,
                    "Rename failed, falling back to copy and delete",
                );
                self.copy(from, to).await?;
                self.delete(from).await?;
                Ok(MoveMethod::Copied)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;

    /// Delegates to a [`LocalBackend`] but refuses every rename, the way a
    /// cross-device rename fails.
    struct NoRename(LocalBackend);

    #[async_trait]
    impl StorageBackend for NoRename {
        fn name(&self) -> &str {
            "no-rename"
        }
        async fn glob(&self, dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
            self.0.glob(dir, pattern).await
        }
        async fn stat(&self, path: &Path) -> Result<FileInfo> {
            self.0.stat(path).await
        }
        async fn create_dir_all(&self, path: &Path) -> Result<()> {
            self.0.create_dir_all(path).await
        }
        async fn archive(&self, source: &Path, target: &Path, compression: Compression) -> Result<u64> {
            self.0.archive(source, target, compression).await
        }
        async fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
            self.0.copy(from, to).await
        }
        async fn rename(&self, _from: &Path, _to: &Path) -> Result<()> {
            exn::bail!(ErrorKind::BackendError("cross-device link".to_string()))
        }
        async fn delete(&self, path: &Path) -> Result<()> {
            self.0.delete(path).await
        }
    }

    #[tokio::test]
    async fn test_move_renames_when_possible() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("in/report.csv");
        let to = dir.path().join("out/nested/report.csv");
        fs::create_dir_all(from.parent().unwrap()).unwrap();
        fs::write(&from, b"a,b,c").unwrap();

        let method = LocalBackend::new("local").move_file(&from, &to).await.unwrap();
        assert_eq!(method, MoveMethod::Renamed);
        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"a,b,c");
    }

    #[tokio::test]
    async fn test_move_falls_back_to_copy_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("report.csv");
        let to = dir.path().join("out/report.csv");
        let data: Vec<u8> = (0..=255u8).cycle().take(100_000).collect();
        fs::write(&from, &data).unwrap();

        let backend = NoRename(LocalBackend::new("local"));
        let method = backend.move_file(&from, &to).await.unwrap();
        assert_eq!(method, MoveMethod::Copied);
        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), data);
    }

    #[tokio::test]
    async fn test_move_missing_source_keeps_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let backend = NoRename(LocalBackend::new("local"));
        let to = dir.path().join("out/missing.csv");
        let err = backend.move_file(&dir.path().join("missing.csv"), &to).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
        assert!(!to.exists());
    }
}
