//! Transfer registry.
//!
//! Every successful transfer is recorded as one row in an append-only CSV
//! log. The log is the source of truth: it is read once when the registry is
//! opened and replayed into two in-memory lookups, one answering "has this job
//! already handled this file?" and one answering "has this file been handled
//! by anyone on this date?". Rows are never rewritten or removed, so deleting
//! a row by hand is the only way to make a file eligible again.
//!
//! # Log format
//! ```text
//! DateTime,JobName,FileName,NewFilePath
//! 2024-12-31 06:15:02,Job_1_MOVE,report_20241231.csv,/srv/inbox/report_20241231.csv
//! ```

pub mod error;
mod index;
mod models;
mod registry;

pub use crate::index::date_key;
pub use crate::models::{HEADER, TransferRecord};
pub use crate::registry::Registry;

/// Default location of the transfer log, relative to the working directory.
pub const DEFAULT_LOG_PATH: &str = "./processed_files.csv";
