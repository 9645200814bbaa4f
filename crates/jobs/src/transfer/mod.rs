//! Transfer engine.
//!
//! Jobs run one after another, and so do the files within a job: the
//! [`Registry`] is owned mutably for the whole run, and each transfer is
//! recorded before the next file is looked at.

pub mod date;
pub mod error;
mod file;

pub use self::file::{Outcome, transfer_file};
use crate::transfer::error::{ErrorKind, Result};
use crate::{Context, TransferJobSpec};
use exn::ResultExt;
use keeper_registry::Registry;
use keeper_storage::BackendHandle;
use std::ops::AddAssign;
use tracing::Instrument;

/// Totals for one transfer run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransferReport {
    pub transferred: usize,
    /// Files skipped because the registry had already seen them.
    pub skipped: usize,
    pub failed: usize,
    /// Jobs stopped before looking at any file (bad date, bad pattern).
    pub aborted_jobs: usize,
}
impl AddAssign for TransferReport {
    fn add_assign(&mut self, other: Self) {
        self.transferred += other.transferred;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.aborted_jobs += other.aborted_jobs;
    }
}

/// Run every transfer job in order.
///
/// `date` overrides today's date for patterns with a date placeholder and
/// for registry lookups. A job that can't resolve its pattern is logged and
/// skipped; a file that can't be transferred is logged and skipped.
pub async fn transfer(
    backend: &BackendHandle,
    registry: &mut Registry,
    jobs: &[TransferJobSpec],
    date: Option<&str>,
    ctx: &Context,
) -> TransferReport {
    let mut report = TransferReport::default();
    for job in jobs {
        let span = tracing::info_span!("transfer_job", job = %job.identity());
        match transfer_job(backend, registry, job, date, ctx).instrument(span).await {
            Ok(job_report) => report += job_report,
            Err(err) if err.is_job_level() => {
                tracing::error!(job = %job.identity(), error = ?err, "Transfer job aborted");
                report.aborted_jobs += 1;
            },
            Err(err) => {
                tracing::error!(job = %job.identity(), error = ?err, "Transfer job failed");
                report.failed += 1;
            },
        }
    }
    tracing::info!(
        transferred = report.transferred,
        skipped = report.skipped,
        failed = report.failed,
        aborted_jobs = report.aborted_jobs,
        "Transfer run complete",
    );
    report
}

async fn transfer_job(
    backend: &BackendHandle,
    registry: &mut Registry,
    job: &TransferJobSpec,
    date: Option<&str>,
    ctx: &Context,
) -> Result<TransferReport> {
    let resolved = date::resolve(&job.file_pattern, date, ctx.clock.today())?;
    tracing::info!(pattern = %resolved.pattern, source = %job.source_dir.display(), "Resolved pattern");
    let files = backend
        .glob(&job.source_dir, &resolved.pattern)
        .await
        .or_raise(|| ErrorKind::Discovery(resolved.pattern.clone()))?;
    let mut report = TransferReport::default();
    if files.is_empty() {
        tracing::warn!(pattern = %resolved.pattern, "No files match pattern");
        return Ok(report);
    }
    tracing::info!(files = files.len(), "Found files to transfer");

    let registry_date = date::registry_date(&resolved.date);
    for source in files {
        match transfer_file(backend, registry, job, &registry_date, &source, ctx).await {
            Ok(Outcome::Transferred { .. }) => report.transferred += 1,
            Ok(Outcome::AlreadyProcessed) => report.skipped += 1,
            Err(err) => {
                let retryable = err.is_retryable();
                tracing::error!(path = %source.display(), retryable, error = ?err, "Failed to transfer file");
                report.failed += 1;
            },
        }
    }
    Ok(report)
}
