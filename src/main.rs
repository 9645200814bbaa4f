mod cli;
mod error;
mod logging;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use keeper_config::Settings;
use keeper_jobs::notify::{NotifierHandle, SqlNotifier};
use keeper_jobs::{Clock, Context, archive, transfer};
use keeper_registry::Registry;
use keeper_storage::BackendHandle;
use keeper_storage::backend::{LocalBackend, ReadOnlyBackend};
use std::fmt::Display;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let cli = Cli::parse();
    // The local offset can only be read soundly while this is the only thread.
    let local = Clock::local();
    match run(cli, local) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Run failed");
            eprintln!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli, local: std::result::Result<Clock, impl Display>) -> Result<()> {
    let file = Settings::locate(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    let settings = Settings::from_file(file.as_deref()).or_raise(|| ErrorKind::Config)?;
    logging::init(&settings.log)?;
    match &file {
        Some(file) => tracing::debug!(path = %file.display(), "Loaded config file"),
        None => tracing::debug!("No config file found, using defaults and environment"),
    }
    let clock = clock_or_utc(local);
    if cli.dry_run {
        tracing::info!("Dry run: no files, transfer log entries or notifications will be written");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build().or_raise(|| ErrorKind::Runtime)?;
    runtime.block_on(execute(cli, settings, clock))
}

fn clock_or_utc(local: std::result::Result<Clock, impl Display>) -> Clock {
    local.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "Cannot determine local UTC offset, using UTC");
        Clock::utc()
    })
}

async fn execute(cli: Cli, settings: Settings, clock: Clock) -> Result<()> {
    let local: BackendHandle = Arc::new(LocalBackend::new("local"));
    let backend: BackendHandle = if cli.dry_run { Arc::new(ReadOnlyBackend::new(local)) } else { local };
    let mut ctx = Context::new(clock).with_dry_run(cli.dry_run);

    match cli.command {
        Command::Archive => {
            let report = archive::archive(&backend, &settings.archive.jobs, settings.archive.max_workers, &ctx).await;
            tracing::info!(
                archived = report.archived,
                skipped = report.skipped,
                failed = report.failed,
                units = report.units,
                "Archive run finished"
            );
        },
        Command::Transfer { date } => {
            if let Some(url) = &settings.notify.database {
                let notifier: NotifierHandle = Arc::new(SqlNotifier::new(url).or_raise(|| ErrorKind::Notifier)?);
                ctx = ctx.with_notifier(notifier);
            }
            let mut registry = Registry::open(&settings.transfer.registry, cli.dry_run).await;
            tracing::debug!(path = %registry.path().display(), records = registry.len(), "Transfer log loaded");
            let report =
                transfer::transfer(&backend, &mut registry, &settings.transfer.jobs, date.as_deref(), &ctx).await;
            tracing::info!(
                transferred = report.transferred,
                skipped = report.skipped,
                failed = report.failed,
                aborted_jobs = report.aborted_jobs,
                "Transfer run finished"
            );
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::offset;

    #[test]
    fn test_clock_falls_back_to_utc() {
        assert_eq!(clock_or_utc(Err("indeterminate offset")), Clock::utc());
        let local = Clock::new(offset!(+2));
        assert_eq!(clock_or_utc(Ok::<_, &str>(local)), local);
    }
}
