//! Local filesystem storage backend.
//!
//! Everything goes through `tokio::fs` except archiving, which hands the
//! synchronous zip writer to the blocking thread pool.

use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::glob;
use crate::models::FileInfo;
use async_trait::async_trait;
use exn::ResultExt;
use keeper_compress::Compression;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;

/// Local filesystem storage backend.
///
/// # Examples
///
/// ```no_run
/// use keeper_storage::backend::LocalBackend;
/// use keeper_storage::StorageBackend;
/// use std::path::Path;
///
/// # async fn example() -> keeper_storage::error::Result<()> {
/// let backend = LocalBackend::new("local");
/// let logs = backend.glob(Path::new("/var/log/app"), "*.log").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LocalBackend {
    name: String,
}
impl LocalBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn glob(&self, dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        glob::expand(dir, pattern).await
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let metadata = fs::metadata(path).await.map_err(|e| Self::map_io_error(e, path))?;
        Ok(FileInfo::from_metadata(path, &metadata).map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        Ok(fs::create_dir_all(path).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    #[instrument(skip(self), fields(backend = %self.name))]
    async fn archive(&self, source: &Path, target: &Path, compression: Compression) -> Result<u64> {
        let (source, target) = (source.to_path_buf(), target.to_path_buf());
        let result_of_thread = tokio::task::spawn_blocking(move || compression.archive_file(&source, &target)).await;
        let result =
            result_of_thread.or_raise(|| ErrorKind::BackendError("archive task did not complete".to_string()))?;
        result.map_err(ErrorKind::compression)
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, parent))?;
        }
        let mut source = fs::File::open(from).await.map_err(|e| Self::map_io_error(e, from))?;
        let mut target = fs::File::create(to).await.map_err(|e| Self::map_io_error(e, to))?;
        let bytes = tokio::io::copy(&mut source, &mut target).await.map_err(|e| Self::map_io_error(e, to))?;
        target.flush().await.map_err(|e| Self::map_io_error(e, to))?;
        target.sync_all().await.map_err(|e| Self::map_io_error(e, to))?;
        Ok(bytes)
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        Ok(fs::rename(from, to).await.map_err(|e| Self::map_io_error(e, from))?)
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        Ok(fs::remove_file(path).await.map_err(|e| Self::map_io_error(e, path))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{File, create_dir_all, read, write};

    fn backend() -> LocalBackend {
        LocalBackend::new("local")
    }

    #[tokio::test]
    async fn test_stat() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.txt");
        write(&path, b"Hello, world!").unwrap();
        let info = backend().stat(&path).await.unwrap();
        assert_eq!(info.path, path);
        assert_eq!(info.size, 13);
        assert!(!info.is_dir);

        let info = backend().stat(dir.path()).await.unwrap();
        assert!(info.is_dir);
    }

    #[tokio::test]
    async fn test_stat_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = backend().stat(&dir.path().join("missing")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_stat_reports_modified_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.log");
        let file = File::create(&path).unwrap();
        let mtime = time::macros::datetime!(2024-03-07 12:00 UTC);
        file.set_modified(mtime.into()).unwrap();
        drop(file);
        assert_eq!(backend().stat(&path).await.unwrap().modified, mtime);
    }

    #[tokio::test]
    async fn test_create_dir_all() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("2024/03/07");
        backend().create_dir_all(&nested).await.unwrap();
        assert!(nested.is_dir());
        // Existing directories are fine.
        backend().create_dir_all(&nested).await.unwrap();
    }

    #[tokio::test]
    async fn test_archive() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("app.log");
        let target = dir.path().join("app.log.zip");
        write(&source, b"line one\nline two\n").unwrap();
        let bytes = backend().archive(&source, &target, Compression::Deflate).await.unwrap();
        assert_eq!(bytes, 18);
        let (name, content) = keeper_compress::read_single_entry(File::open(&target).unwrap()).unwrap();
        assert_eq!(name, "app.log");
        assert_eq!(content, b"line one\nline two\n");
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_archive_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = backend()
            .archive(&dir.path().join("missing.log"), &dir.path().join("missing.log.zip"), Compression::Deflate)
            .await
            .unwrap_err();
        assert!(matches!(&*err, ErrorKind::Compression(_)));
    }

    #[tokio::test]
    async fn test_copy_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("report.csv");
        let to = dir.path().join("a/b/report.csv");
        write(&from, b"data").unwrap();
        assert_eq!(backend().copy(&from, &to).await.unwrap(), 4);
        assert_eq!(read(&to).unwrap(), b"data");
        assert!(from.exists());
    }

    #[tokio::test]
    async fn test_copy_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("report.csv");
        let to = dir.path().join("out/report.csv");
        write(&from, b"new").unwrap();
        create_dir_all(to.parent().unwrap()).unwrap();
        write(&to, b"older and longer").unwrap();
        backend().copy(&from, &to).await.unwrap();
        assert_eq!(read(&to).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("old.txt");
        let to = dir.path().join("new.txt");
        write(&from, b"data").unwrap();
        backend().rename(&from, &to).await.unwrap();
        assert!(!from.exists());
        assert_eq!(read(&to).unwrap(), b"data");

        backend().delete(&to).await.unwrap();
        assert!(!to.exists());
        let err = backend().delete(&to).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_glob() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path().join("b.log"), b"").unwrap();
        write(dir.path().join("a.log"), b"").unwrap();
        write(dir.path().join("c.txt"), b"").unwrap();
        let found = backend().glob(dir.path(), "*.log").await.unwrap();
        assert_eq!(found, vec![dir.path().join("a.log"), dir.path().join("b.log")]);
    }
}
