//! Filesystem operations used by keeper jobs.
//!
//! Everything the jobs do to the filesystem goes through the
//! [`StorageBackend`] trait: glob discovery, stat, directory creation,
//! single-file archiving, copying, renaming, moving and deleting. The
//! [`LocalBackend`](backend::LocalBackend) talks to the local filesystem;
//! [`ReadOnlyBackend`](backend::ReadOnlyBackend) wraps another backend for
//! dry runs.

pub mod backend;
pub mod error;
mod glob;
mod models;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::models::{FileInfo, MoveMethod};
pub use crate::path::{dated_folder, file_name, validate_file_name};
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
