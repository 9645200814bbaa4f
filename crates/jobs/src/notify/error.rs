//! Error types for the [`notify`](super) module.

use derive_more::{Display, Error};

/// A notification error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for notification operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The connection URL could not be parsed.
    #[display("invalid notification database URL")]
    InvalidUrl,
    #[display("cannot connect to notification database")]
    Connect,
    #[display("notification database did not answer ping")]
    Ping,
    #[display("notification statement failed")]
    Execute,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidUrl)
    }
}
