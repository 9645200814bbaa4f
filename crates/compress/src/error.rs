//! Compression Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A compression error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for compression operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The zip writer rejected the entry or could not finalize the archive.
    Archive,
    /// Archive is corrupt, malformed or doesn't contain exactly one entry.
    /// Don't retry with the same input.
    #[display("invalid or corrupted archive")]
    InvalidData,
    /// The file's base name can't be used as an entry name (missing or not UTF-8).
    #[display("invalid entry name: {_0}")]
    InvalidName(#[error(not(source))] String),
    /// The requested method is not supported.
    #[display("unsupported format: {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
    /// The requested method is supported but not enabled.
    #[display("disabled format: {_0}")]
    DisabledFormat(#[error(not(source))] String),
    /// An I/O operation failed while reading the source or writing the archive.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io | ErrorKind::Archive)
    }
}
