//! Registry Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A registry error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A record could not be made durable. The transfer it describes will be
    /// repeated on the next run.
    #[display("cannot append to transfer log: {}", _0.display())]
    Write(#[error(not(source))] PathBuf),
    /// A record could not be encoded as a CSV row.
    #[display("invalid transfer record")]
    InvalidRecord,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Write(_))
    }
}
