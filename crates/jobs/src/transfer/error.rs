//! Error types for the [`transfer`](super) module.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A transfer error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for transfer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// ### Job-level (the job stops, other jobs continue)
/// - [`ErrorKind::InvalidDate`]
/// - [`ErrorKind::Discovery`]
///
/// ### File-level (the file is skipped, the job continues)
/// - [`ErrorKind::InvalidName`]
/// - [`ErrorKind::UnknownTransferType`]
/// - [`ErrorKind::Stat`]
/// - [`ErrorKind::Copy`]
/// - [`ErrorKind::Move`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The explicit date is neither six nor eight characters long.
    #[display("invalid date {_0:?}, expected YYMMDD or YYYYMMDD")]
    InvalidDate(#[error(not(source))] String),
    /// The resolved pattern could not be matched against the source directory.
    #[display("cannot search for {_0:?}")]
    Discovery(#[error(not(source))] String),
    #[display("unusable file name: {}", _0.display())]
    InvalidName(#[error(not(source))] PathBuf),
    #[display("unknown transfer type {_0:?}")]
    UnknownTransferType(#[error(not(source))] String),
    #[display("cannot read metadata of {}", _0.display())]
    Stat(#[error(not(source))] PathBuf),
    #[display("cannot copy {}", _0.display())]
    Copy(#[error(not(source))] PathBuf),
    #[display("cannot move {}", _0.display())]
    Move(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Stat(_) | Self::Copy(_) | Self::Move(_))
    }

    /// Whether this error stops the whole job rather than a single file.
    pub fn is_job_level(&self) -> bool {
        matches!(self, Self::InvalidDate(_) | Self::Discovery(_))
    }
}
