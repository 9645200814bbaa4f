//! Read-only storage backend.
//!
//! Wraps another backend, letting discovery and metadata through while
//! dropping every mutation and reporting success. Used for dry runs.

use async_trait::async_trait;
use keeper_compress::Compression;
use std::path::{Path, PathBuf};

use crate::{BackendHandle, StorageBackend, error::Result, models::FileInfo};

/// Read-only storage backend.
///
/// Wraps another backend and silently drops all write operations, logging an
/// [`info event`](tracing::Event). Operations that report a size (archive,
/// copy) report the size of the source instead.
#[derive(Clone)]
pub struct ReadOnlyBackend {
    inner: BackendHandle,
}
impl ReadOnlyBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StorageBackend for ReadOnlyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn glob(&self, dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        self.inner.glob(dir, pattern).await
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        self.inner.stat(path).await
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        tracing::info!(path = %path.display(), "Skipping directory creation during read-only mode");
        Ok(())
    }

    async fn archive(&self, source: &Path, target: &Path, compression: Compression) -> Result<u64> {
        let size = self.inner.stat(source).await?.size;
        tracing::info!(
            source = %source.display(),
            target = %target.display(),
            %compression,
            "Skipping archive during read-only mode",
        );
        Ok(size)
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        let size = self.inner.stat(from).await?.size;
        tracing::info!(from = %from.display(), to = %to.display(), "Skipping copy during read-only mode");
        Ok(size)
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        tracing::info!(from = %from.display(), to = %to.display(), "Skipping rename/move during read-only mode");
        Ok(())
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        tracing::info!(path = %path.display(), "Skipping delete during read-only mode");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MoveMethod;
    use crate::backend::LocalBackend;
    use std::fs::write;
    use std::sync::Arc;

    fn backend() -> ReadOnlyBackend {
        ReadOnlyBackend::new(Arc::new(LocalBackend::new("local")))
    }

    #[tokio::test]
    async fn test_reads_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path().join("a.log"), b"data").unwrap();
        let backend = backend();
        assert_eq!(backend.name(), "local");
        assert_eq!(backend.glob(dir.path(), "*.log").await.unwrap().len(), 1);
        assert_eq!(backend.stat(&dir.path().join("a.log")).await.unwrap().size, 4);
    }

    #[tokio::test]
    async fn test_mutations_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.log");
        write(&source, b"data").unwrap();
        let backend = backend();

        let nested = dir.path().join("2024/03/07");
        backend.create_dir_all(&nested).await.unwrap();
        assert!(!nested.exists());

        let archive = dir.path().join("a.log.zip");
        assert_eq!(backend.archive(&source, &archive, Compression::Deflate).await.unwrap(), 4);
        assert!(!archive.exists());

        let copy = dir.path().join("out/a.log");
        assert_eq!(backend.copy(&source, &copy).await.unwrap(), 4);
        assert!(!copy.exists());

        assert_eq!(backend.move_file(&source, &copy).await.unwrap(), MoveMethod::Renamed);
        backend.delete(&source).await.unwrap();
        assert!(source.exists());
        assert!(!copy.exists());
    }
}
