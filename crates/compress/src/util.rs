use crate::Compression;
use std::fmt::{Display, Formatter, Result as FmtResult};
use zip::CompressionMethod;

// Use the highest compression level available for each method; backups are
// written once and kept for a long time. If an end-user finds these levels
// too resource-intensive, choose a different method.
const DEFLATE_LEVEL: i64 = 9;
const BZIP2_LEVEL: i64 = 9;
#[cfg(feature = "zstd")]
const ZSTD_LEVEL: i64 = 22;

impl Display for Compression {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for Compression {
    fn as_ref(&self) -> &'static str {
        self.as_str()
    }
}

impl From<Compression> for CompressionMethod {
    fn from(value: Compression) -> Self {
        value.method()
    }
}

impl Compression {
    /// Returns the short name for configuration (for displaying to user)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::Stored => "stored",
            Compression::Deflate => "deflate",
            Compression::Bzip2 => "bzip2",
            #[cfg(feature = "zstd")]
            Compression::Zstd => "zstd",
        }
    }

    /// The zip compression method written into the entry header.
    #[inline]
    #[must_use]
    pub fn method(&self) -> CompressionMethod {
        match self {
            Compression::Stored => CompressionMethod::Stored,
            Compression::Deflate => CompressionMethod::Deflated,
            Compression::Bzip2 => CompressionMethod::Bzip2,
            #[cfg(feature = "zstd")]
            Compression::Zstd => CompressionMethod::Zstd,
        }
    }

    /// Compression level passed to the zip writer, `None` for methods
    /// without levels.
    #[inline]
    #[must_use]
    pub fn level(&self) -> Option<i64> {
        match self {
            Compression::Stored => None,
            Compression::Deflate => Some(DEFLATE_LEVEL),
            Compression::Bzip2 => Some(BZIP2_LEVEL),
            #[cfg(feature = "zstd")]
            Compression::Zstd => Some(ZSTD_LEVEL),
        }
    }
}
