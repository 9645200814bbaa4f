use crate::archive::error::{ErrorKind, Result};
use crate::{ArchiveJobSpec, Context};
use exn::ResultExt;
use keeper_compress::archive_name;
use keeper_storage::{BackendHandle, dated_folder, file_name};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Why a file was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// Patterns can match directories; only files are archived.
    Directory,
    /// Modified more recently than the job's minimum age.
    TooRecent,
}

/// The outcome of (successfully) processing a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The file was compressed into `archive`. `removed` reports whether the
    /// original was deleted afterwards; a failed deletion is logged but does
    /// not undo the archive.
    Archived { archive: PathBuf, removed: bool },
    Skipped(Skip),
}

/// Archive a single file according to `job`.
///
/// The archive lands in `dest_dir/YYYY/MM/DD/<name>.zip`, where the date is
/// the file's last modification in the [`Clock`](crate::Clock)'s offset. An
/// existing archive at that path is overwritten.
#[instrument(skip(backend, job, ctx), fields(job = job.id))]
pub async fn archive_file(
    backend: &BackendHandle,
    job: &ArchiveJobSpec,
    path: &Path,
    ctx: &Context,
) -> Result<Action> {
    let info = backend.stat(path).await.or_raise(|| ErrorKind::Stat(path.to_path_buf()))?;
    if info.is_dir {
        return Ok(Action::Skipped(Skip::Directory));
    }
    if job.min_age_hours != 0 {
        // Whole hours round down, so "less than N hours" holds exactly when
        // the fractional age is below N.
        let age = info.age(ctx.clock.now()).whole_hours();
        if age < i64::try_from(job.min_age_hours).unwrap_or(i64::MAX) {
            tracing::debug!(age_hours = age, min_age_hours = job.min_age_hours, "File too recent to archive");
            return Ok(Action::Skipped(Skip::TooRecent));
        }
    }

    let name = file_name(path).or_raise(|| ErrorKind::InvalidName(path.to_path_buf()))?;
    let folder = dated_folder(&job.dest_dir, ctx.clock.localize(info.modified).date());
    backend.create_dir_all(&folder).await.or_raise(|| ErrorKind::CreateFolder(folder.clone()))?;
    let archive = folder.join(archive_name(name));
    let bytes = backend
        .archive(path, &archive, job.compression)
        .await
        .or_raise(|| ErrorKind::Compress(path.to_path_buf()))?;
    tracing::info!(archive = %archive.display(), bytes, "Archived file");

    let removed = if job.delete_original {
        match backend.delete(path).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = ?err, "Archived file but could not delete the original");
                false
            },
        }
    } else {
        false
    };
    Ok(Action::Archived { archive, removed })
}
