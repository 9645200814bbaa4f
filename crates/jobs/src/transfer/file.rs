use crate::notify::Notification;
use crate::transfer::error::{ErrorKind, Result};
use crate::{Context, TransferJobSpec, TransferType};
use exn::ResultExt;
use keeper_registry::Registry;
use keeper_storage::{BackendHandle, file_name};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// The outcome of (successfully) processing a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The registry says this file was already handled; nothing was done.
    AlreadyProcessed,
    /// The file was copied or moved to `destination`. `recorded` is `false`
    /// when the registry append failed, in which case the file will be
    /// transferred again on the next run.
    Transferred { destination: PathBuf, transfer_type: TransferType, recorded: bool },
}

/// Transfer a single file for `job`, unless the registry says it was already
/// transferred.
///
/// `date` is the registry date of this run, `YYYYMMDD` or whatever was given
/// explicitly. Jobs with `process_once` check whether any job transferred a
/// file of the same name on that date; other jobs check whether this job
/// transferred it at all.
#[instrument(skip(backend, registry, job, ctx), fields(job = %job.identity()))]
pub async fn transfer_file(
    backend: &BackendHandle,
    registry: &mut Registry,
    job: &TransferJobSpec,
    date: &str,
    source: &Path,
    ctx: &Context,
) -> Result<Outcome> {
    let name = file_name(source).or_raise(|| ErrorKind::InvalidName(source.to_path_buf()))?;
    let identity = job.identity();
    let seen = if job.process_once {
        registry.is_processed_on_date(name, date)
    } else {
        registry.is_processed_by_job(name, &identity)
    };
    if seen {
        tracing::info!(file = name, process_once = job.process_once, "Already processed, skipping");
        return Ok(Outcome::AlreadyProcessed);
    }

    let transfer_type = job
        .transfer_type
        .parse::<TransferType>()
        .or_raise(|| ErrorKind::UnknownTransferType(job.transfer_type.clone()))?;
    let size = backend.stat(source).await.or_raise(|| ErrorKind::Stat(source.to_path_buf()))?.size;
    let destination = job.dest_dir.join(name);
    match transfer_type {
        TransferType::Copy => {
            backend.copy(source, &destination).await.or_raise(|| ErrorKind::Copy(source.to_path_buf()))?;
        },
        TransferType::Move => {
            let method =
                backend.move_file(source, &destination).await.or_raise(|| ErrorKind::Move(source.to_path_buf()))?;
            tracing::debug!(?method, "Moved file");
        },
    }
    tracing::info!(%transfer_type, destination = %destination.display(), bytes = size, "Transferred file");

    let recorded = match registry.append(&identity, name, &destination, ctx.clock.wall_time()).await {
        Ok(_) => true,
        Err(err) => {
            tracing::error!(
                retryable = err.is_retryable(),
                error = ?err,
                "Transferred file but could not record it; it will be transferred again on the next run",
            );
            false
        },
    };
    if recorded {
        let notification = Notification {
            file_name: name,
            new_file_name: name,
            location: &job.dest_dir,
            file_size: size,
        };
        notify(job, notification, ctx).await;
    }
    Ok(Outcome::Transferred { destination, transfer_type, recorded })
}

async fn notify(job: &TransferJobSpec, notification: Notification<'_>, ctx: &Context) {
    let Some(template) = job.notify_template.as_deref().filter(|t| !t.trim().is_empty()) else {
        return;
    };
    if ctx.dry_run {
        tracing::info!("Skipping notification during dry run");
        return;
    }
    let Some(notifier) = &ctx.notifier else {
        tracing::warn!("Job has a notification template but no notification database is configured");
        return;
    };
    let statement = notification.render(template);
    match notifier.notify(&statement).await {
        Ok(()) => tracing::info!("Notification sent"),
        Err(err) => tracing::error!(retryable = err.is_retryable(), error = ?err, "Notification failed"),
    }
}
