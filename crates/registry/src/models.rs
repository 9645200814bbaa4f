use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::PathBuf;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Column names written as the first row of a new log.
pub const HEADER: [&str; 4] = ["DateTime", "JobName", "FileName", "NewFilePath"];

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// One row of the transfer log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    /// Local wall-clock time the transfer was recorded.
    pub timestamp: PrimitiveDateTime,
    /// Identity of the job that performed the transfer, `Job_<id>_<type>`.
    pub job_identity: String,
    /// Base name of the transferred file.
    pub file_name: String,
    /// Where the file ended up.
    pub destination: PathBuf,
}
impl TransferRecord {
    /// Timestamp as written to the log, `YYYY-MM-DD HH:MM:SS`.
    pub fn formatted_timestamp(&self) -> Result<String> {
        self.timestamp.format(TIMESTAMP_FORMAT).or_raise(|| ErrorKind::InvalidRecord)
    }

    pub(crate) fn to_row(&self) -> Result<[String; 4]> {
        Ok([
            self.formatted_timestamp()?,
            self.job_identity.clone(),
            self.file_name.clone(),
            self.destination.to_string_lossy().into_owned(),
        ])
    }
}
