//! Single-file zip archives.
//!
//! Every archive produced by this crate contains exactly one entry, named
//! after the base name of the file it was built from, with no directory
//! structure and no metadata beyond what the zip format stores by default.
//! The [`Compression`] enum selects the entry's compression method:
//!
//! - **Writing** from a path ([`Compression::archive_file`]) or from any
//!   reader into any seekable writer ([`Compression::archive_stream`])
//! - **Reading** the single entry back ([`read_single_entry`]), mostly useful
//!   for verifying archives
//!
//! Stored, Deflate and Bzip2 are always available; Zstd is behind the `zstd`
//! feature flag. All compression uses the highest level available for each
//! method, prioritizing storage space over speed.

mod construct;
pub mod error;
mod ops;
mod util;

pub use crate::ops::read_single_entry;

/// File extension appended to the base name of every archived file.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Compression method used for the single entry of an archive.
///
/// Variants gated behind feature flags (`zstd`) are only available when the
/// corresponding feature is enabled. Defaults to [`Deflate`](Self::Deflate),
/// the method every zip reader understands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// No compression, the entry is stored as-is.
    Stored,
    /// Deflate compression
    #[default]
    Deflate,
    /// Bzip2 compression
    Bzip2,
    /// Zstd compression
    #[cfg(feature = "zstd")]
    Zstd,
}

/// Name of the archive built from a file called `file_name`.
///
/// ```
/// assert_eq!(keeper_compress::archive_name("app.log"), "app.log.zip");
/// ```
#[must_use]
pub fn archive_name(file_name: impl AsRef<str>) -> String {
    format!("{}.{ARCHIVE_EXTENSION}", file_name.as_ref())
}
