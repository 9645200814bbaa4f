//! Archive and transfer jobs.
//!
//! Two independent commands share this crate:
//!
//! - [`archive`](archive::archive) finds aged files matching glob patterns and
//!   compresses each one into a dated backup folder, fanning the work out
//!   across a bounded [worker pool](keeper_asyncutils::WorkerPool).
//! - [`transfer`](transfer::transfer) finds files matching a date-templated
//!   pattern, copies or moves them, and records each transfer in the
//!   [`Registry`](keeper_registry::Registry) so that it happens at most once.
//!
//! Both take their filesystem access through a
//! [`BackendHandle`](keeper_storage::BackendHandle) and their sense of time
//! through the [`Clock`] in the shared [`Context`].

pub mod archive;
mod clock;
pub mod notify;
mod spec;
pub mod transfer;

pub use crate::clock::Clock;
pub use crate::spec::{ArchiveJobSpec, DEFAULT_MIN_AGE_HOURS, TransferJobSpec, TransferType, UnknownTransferType};
use crate::notify::NotifierHandle;

/// Run-wide settings shared by every job.
#[derive(Clone, Default)]
pub struct Context {
    pub clock: Clock,
    /// Where rendered notification statements are sent, if anywhere.
    pub notifier: Option<NotifierHandle>,
    /// Dry runs never send notifications. Filesystem and registry writes are
    /// suppressed by the backend and registry handed to the jobs.
    pub dry_run: bool,
}
impl Context {
    pub fn new(clock: Clock) -> Self {
        Self { clock, ..Self::default() }
    }

    pub fn with_notifier(mut self, notifier: NotifierHandle) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
