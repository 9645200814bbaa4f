//! Binary Error Types

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons the run could not start. Failures inside a job never end up here;
/// they are logged and counted in the run report.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("cannot load configuration")]
    Config,
    #[display("cannot install logger")]
    Logging,
    #[display("cannot start async runtime")]
    Runtime,
    #[display("cannot set up notifications")]
    Notifier,
}
