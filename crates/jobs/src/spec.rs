//! Job specifications.
//!
//! Specs are plain data, deserialized from configuration and never changed
//! afterwards. One spec drives one job for the whole run.

use derive_more::{Display, Error};
use keeper_compress::Compression;
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

/// Files younger than this are left alone unless a job says otherwise.
pub const DEFAULT_MIN_AGE_HOURS: u64 = 24;

fn default_min_age_hours() -> u64 {
    DEFAULT_MIN_AGE_HOURS
}

/// Compress aged files from `source_dir` into `dest_dir/YYYY/MM/DD/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArchiveJobSpec {
    /// Identifier used in logs. Zero means "not set"; configuration assigns
    /// the job's 1-based position instead.
    #[serde(default)]
    pub id: u32,
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    /// One or more glob patterns joined by `pattern_separator`.
    pub file_patterns: String,
    #[serde(default)]
    pub pattern_separator: String,
    /// Zero disables the age filter.
    #[serde(default = "default_min_age_hours")]
    pub min_age_hours: u64,
    #[serde(default)]
    pub delete_original: bool,
    #[serde(default)]
    pub compression: Compression,
}
impl ArchiveJobSpec {
    /// The individual glob patterns of this job, in order.
    ///
    /// An empty separator means `file_patterns` is a single pattern.
    /// Surrounding whitespace is trimmed and empty segments are dropped.
    ///
    /// ```
    /// # use keeper_jobs::ArchiveJobSpec;
    /// # let mut job = ArchiveJobSpec {
    /// #     id: 1,
    /// #     source_dir: "/var/log/app".into(),
    /// #     dest_dir: "/backup/app".into(),
    /// #     file_patterns: String::new(),
    /// #     pattern_separator: String::new(),
    /// #     min_age_hours: 24,
    /// #     delete_original: false,
    /// #     compression: Default::default(),
    /// # };
    /// job.file_patterns = "*.log;; *.txt ;".to_string();
    /// job.pattern_separator = ";".to_string();
    /// assert_eq!(job.patterns().collect::<Vec<_>>(), vec!["*.log", "*.txt"]);
    /// ```
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        let segments: Box<dyn Iterator<Item = &str> + '_> = if self.pattern_separator.is_empty() {
            Box::new(std::iter::once(self.file_patterns.as_str()))
        } else {
            Box::new(self.file_patterns.split(self.pattern_separator.as_str()))
        };
        segments.map(str::trim).filter(|pattern| !pattern.is_empty())
    }
}

/// Copy or move files matching a date-templated pattern, at most once.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransferJobSpec {
    /// Identifier used in the job identity. Zero means "not set"; configuration
    /// assigns the job's 1-based position instead.
    #[serde(default)]
    pub id: u32,
    /// Glob pattern, optionally containing `YYYYMMDD` or `YYMMDD`.
    pub file_pattern: String,
    /// `COPY` or `MOVE`, in any case. Kept as configured: it is part of the
    /// job identity, and an unknown type only fails the files it applies to.
    pub transfer_type: String,
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    /// Statement template for the notification hook, see
    /// [`Notification`](crate::notify::Notification).
    #[serde(default)]
    pub notify_template: Option<String>,
    /// Deduplicate per date across all jobs instead of per job.
    #[serde(default)]
    pub process_once: bool,
}
impl TransferJobSpec {
    /// `Job_<id>_<transfer_type>`, the name this job's records are filed under.
    pub fn identity(&self) -> String {
        format!("Job_{}_{}", self.id, self.transfer_type)
    }
}

#[derive(Debug, Display, Error)]
#[display("unknown transfer type: {_0}")]
pub struct UnknownTransferType(#[error(not(source))] pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TransferType {
    #[display("COPY")]
    Copy,
    #[display("MOVE")]
    Move,
}
impl FromStr for TransferType {
    type Err = UnknownTransferType;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("copy") {
            Ok(Self::Copy)
        } else if s.eq_ignore_ascii_case("move") {
            Ok(Self::Move)
        } else {
            Err(UnknownTransferType(s.to_string()))
        }
    }
}
