//! Archival pipeline.
//!
//! Every (job, pattern) pair with at least one match becomes one unit of
//! work. Units run concurrently on a [`WorkerPool`] shared by all jobs; the
//! files within a unit are archived one after another. [`archive`] returns
//! once every unit has finished.

pub mod error;
mod file;

pub use self::file::{Action, Skip, archive_file};
use crate::{ArchiveJobSpec, Context};
use keeper_asyncutils::WorkerPool;
use keeper_storage::BackendHandle;
use std::ops::AddAssign;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Instrument;

/// Totals for one archive run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveReport {
    pub archived: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Units of work submitted to the pool.
    pub units: usize,
}
impl AddAssign for ArchiveReport {
    fn add_assign(&mut self, other: Self) {
        self.archived += other.archived;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.units += other.units;
    }
}

/// Run every archive job, at most `max_workers` units at a time.
///
/// Discovery failures (an invalid pattern) skip that pattern only; failures
/// archiving a file skip that file only. Both are logged and counted, never
/// returned.
pub async fn archive(
    backend: &BackendHandle,
    jobs: &[ArchiveJobSpec],
    max_workers: usize,
    ctx: &Context,
) -> ArchiveReport {
    let mut pool = WorkerPool::new(max_workers);
    let mut report = ArchiveReport::default();
    for job in jobs {
        let job = Arc::new(job.clone());
        for pattern in job.patterns() {
            let files = match backend.glob(&job.source_dir, pattern).await {
                Ok(files) => files,
                Err(err) => {
                    tracing::error!(job = job.id, pattern, error = ?err, "Skipping pattern");
                    report.failed += 1;
                    continue;
                },
            };
            if files.is_empty() {
                tracing::info!(job = job.id, pattern, dir = %job.source_dir.display(), "No files match pattern");
                continue;
            }
            tracing::info!(job = job.id, pattern, files = files.len(), "Queueing files for archival");
            let span = tracing::info_span!("archive_unit", job = job.id, pattern);
            pool.submit(archive_unit(Arc::clone(backend), Arc::clone(&job), files, ctx.clone()).instrument(span));
        }
    }

    report.units = pool.len();
    for result in pool.run_all().await {
        match result {
            Ok(unit) => report += unit,
            Err(err) => {
                tracing::error!(error = %err, "Archive unit did not complete");
                report.failed += 1;
            },
        }
    }
    tracing::info!(
        archived = report.archived,
        skipped = report.skipped,
        failed = report.failed,
        units = report.units,
        "Archive run complete",
    );
    report
}

async fn archive_unit(
    backend: BackendHandle,
    job: Arc<ArchiveJobSpec>,
    files: Vec<PathBuf>,
    ctx: Context,
) -> ArchiveReport {
    let mut report = ArchiveReport::default();
    for path in files {
        match archive_file(&backend, &job, &path, &ctx).await {
            Ok(Action::Archived { .. }) => report.archived += 1,
            Ok(Action::Skipped(reason)) => {
                tracing::debug!(path = %path.display(), ?reason, "Skipped file");
                report.skipped += 1;
            },
            Err(err) => {
                let retryable = err.is_retryable();
                tracing::error!(path = %path.display(), retryable, error = ?err, "Failed to archive file");
                report.failed += 1;
            },
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Clock;
    use async_trait::async_trait;
    use keeper_compress::Compression;
    use keeper_storage::backend::{LocalBackend, ReadOnlyBackend};
    use keeper_storage::error::Result as StorageResult;
    use keeper_storage::{FileInfo, StorageBackend};
    use std::fs::{File, create_dir_all, read_dir, write};
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use time::macros::datetime;

    fn job(id: u32, root: &Path, patterns: &str, delete_original: bool) -> ArchiveJobSpec {
        ArchiveJobSpec {
            id,
            source_dir: root.join("src"),
            dest_dir: root.join("backup"),
            file_patterns: patterns.to_string(),
            pattern_separator: ",".to_string(),
            min_age_hours: 24,
            delete_original,
            compression: Compression::Deflate,
        }
    }

    fn old_file(root: &Path, name: &str) -> PathBuf {
        let path = root.join("src").join(name);
        create_dir_all(path.parent().unwrap()).unwrap();
        write(&path, name.as_bytes()).unwrap();
        let modified = datetime!(2024-03-07 12:00 UTC);
        File::options().write(true).open(&path).unwrap().set_modified(modified.into()).unwrap();
        path
    }

    fn local() -> BackendHandle {
        Arc::new(LocalBackend::new("local"))
    }

    /// Counts how many archive calls are in flight at once.
    struct Gauged {
        inner: LocalBackend,
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl StorageBackend for Gauged {
        fn name(&self) -> &str {
            "gauged"
        }
        async fn glob(&self, dir: &Path, pattern: &str) -> StorageResult<Vec<PathBuf>> {
            self.inner.glob(dir, pattern).await
        }
        async fn stat(&self, path: &Path) -> StorageResult<FileInfo> {
            self.inner.stat(path).await
        }
        async fn create_dir_all(&self, path: &Path) -> StorageResult<()> {
            self.inner.create_dir_all(path).await
        }
        async fn archive(&self, source: &Path, target: &Path, compression: Compression) -> StorageResult<u64> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            let result = self.inner.archive(source, target, compression).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            result
        }
        async fn copy(&self, from: &Path, to: &Path) -> StorageResult<u64> {
            self.inner.copy(from, to).await
        }
        async fn rename(&self, from: &Path, to: &Path) -> StorageResult<()> {
            self.inner.rename(from, to).await
        }
        async fn delete(&self, path: &Path) -> StorageResult<()> {
            self.inner.delete(path).await
        }
    }

    #[tokio::test]
    async fn test_archive_run() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.log", "b.log", "c.txt", "d.csv"] {
            old_file(dir.path(), name);
        }
        let jobs = vec![job(1, dir.path(), "*.log,*.txt,*.gz", false)];
        let report = archive(&local(), &jobs, 2, &Context::new(Clock::utc())).await;
        assert_eq!(report, ArchiveReport { archived: 3, skipped: 0, failed: 0, units: 2 });

        let mut archived: Vec<_> = read_dir(dir.path().join("backup/2024/03/07"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        archived.sort();
        assert_eq!(archived, vec!["a.log.zip", "b.log.zip", "c.txt.zip"]);
        assert!(dir.path().join("src/a.log").exists());
    }

    #[tokio::test]
    async fn test_invalid_pattern_only_skips_itself() {
        let dir = tempfile::tempdir().unwrap();
        old_file(dir.path(), "a.log");
        let jobs = vec![job(1, dir.path(), "[,*.log", false)];
        let report = archive(&local(), &jobs, 1, &Context::new(Clock::utc())).await;
        assert_eq!(report, ArchiveReport { archived: 1, skipped: 0, failed: 1, units: 1 });
    }

    #[tokio::test]
    async fn test_rerun_after_delete_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        old_file(dir.path(), "a.log");
        let jobs = vec![job(1, dir.path(), "*.log", true)];
        let ctx = Context::new(Clock::utc());
        let first = archive(&local(), &jobs, 1, &ctx).await;
        assert_eq!(first.archived, 1);
        assert!(!dir.path().join("src/a.log").exists());
        let second = archive(&local(), &jobs, 1, &ctx).await;
        assert_eq!(second, ArchiveReport::default());
        assert!(dir.path().join("backup/2024/03/07/a.log.zip").exists());
    }

    #[tokio::test]
    async fn test_young_files_and_directories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        old_file(dir.path(), "old.log");
        write(dir.path().join("src/new.log"), b"fresh").unwrap();
        create_dir_all(dir.path().join("src/dir.log")).unwrap();
        let jobs = vec![job(1, dir.path(), "*.log", false)];
        let report = archive(&local(), &jobs, 4, &Context::new(Clock::utc())).await;
        assert_eq!(report, ArchiveReport { archived: 1, skipped: 2, failed: 0, units: 1 });
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = old_file(dir.path(), "a.log");
        let backend: BackendHandle = Arc::new(ReadOnlyBackend::new(local()));
        let jobs = vec![job(1, dir.path(), "*.log", true)];
        let ctx = Context::new(Clock::utc()).with_dry_run(true);
        let report = archive(&backend, &jobs, 1, &ctx).await;
        assert_eq!(report.archived, 1);
        assert!(source.exists());
        assert!(!dir.path().join("backup").exists());
    }

    #[rstest::rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_is_bounded(#[case] max_workers: usize) {
        let dir = tempfile::tempdir().unwrap();
        let mut jobs = Vec::new();
        for id in 1..=4u32 {
            for n in 0..2 {
                old_file(dir.path(), &format!("job{id}_{n}.log"));
                old_file(dir.path(), &format!("job{id}_{n}.txt"));
            }
            jobs.push(job(id, dir.path(), &format!("job{id}_*.log,job{id}_*.txt"), false));
        }
        let gauged = Arc::new(Gauged {
            inner: LocalBackend::new("local"),
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let backend: BackendHandle = gauged.clone();

        let report = archive(&backend, &jobs, max_workers, &Context::new(Clock::utc())).await;
        assert_eq!(report, ArchiveReport { archived: 16, skipped: 0, failed: 0, units: 8 });
        let peak = gauged.peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= max_workers, "peak {peak} exceeds {max_workers}");
    }
}
