//! Error types for the [`archive`](super) module.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An archive error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which step of archiving a single file failed. The file is left where it
/// was in every case.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The file could not be inspected (it may have vanished since discovery).
    #[display("cannot read metadata of {}", _0.display())]
    Stat(#[error(not(source))] PathBuf),
    /// The file name can't be used as an archive entry.
    #[display("unusable file name: {}", _0.display())]
    InvalidName(#[error(not(source))] PathBuf),
    /// The dated backup folder could not be created.
    #[display("cannot create backup folder {}", _0.display())]
    CreateFolder(#[error(not(source))] PathBuf),
    /// Writing the archive failed.
    #[display("cannot archive {}", _0.display())]
    Compress(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidName(_))
    }
}
