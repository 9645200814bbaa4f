//! Archive Operations

use crate::Compression;
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;
use tracing::instrument;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

// Entries at or above this size need the zip64 extensions.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

impl Compression {
    fn options(&self, size_hint: u64) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(self.method())
            .compression_level(self.level())
            .large_file(size_hint >= ZIP64_THRESHOLD)
    }

    /// Write a single-entry archive named `name` containing everything read
    /// from `reader`, returning the number of uncompressed bytes archived
    /// along with the writer.
    ///
    /// `size_hint` only decides whether zip64 extensions are enabled for the
    /// entry; pass the source file's length when known.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use keeper_compress::{Compression, read_single_entry};
    ///
    /// let (bytes, archive) = Compression::Deflate
    ///     .archive_stream("hello.txt", &b"Hello, world!"[..], Cursor::new(Vec::new()), 13)
    ///     .unwrap();
    /// assert_eq!(bytes, 13);
    /// let (name, content) = read_single_entry(Cursor::new(archive.into_inner())).unwrap();
    /// assert_eq!(name, "hello.txt");
    /// assert_eq!(content, b"Hello, world!");
    /// ```
    #[instrument(skip(self, reader, writer), fields(format = %self, bytes))]
    pub fn archive_stream<R: Read, W: Write + Seek>(
        &self,
        name: &str,
        mut reader: R,
        writer: W,
        size_hint: u64,
    ) -> Result<(u64, W)> {
        // The entry must be a bare file name: no nesting inside the archive.
        if name.is_empty() || name.contains(['/', '\\']) {
            exn::bail!(ErrorKind::InvalidName(name.to_string()));
        }
        let mut zip = ZipWriter::new(writer);
        zip.start_file(name, self.options(size_hint)).or_raise(|| ErrorKind::Archive)?;
        let bytes = io::copy(&mut reader, &mut zip).or_raise(|| ErrorKind::Io)?;
        let writer = zip.finish().or_raise(|| ErrorKind::Archive)?;
        tracing::Span::current().record("bytes", bytes);
        Ok((bytes, writer))
    }

    /// Archive the file at `source` into a new archive at `target`, replacing
    /// any archive already there. The single entry is named after the base
    /// name of `source`.
    ///
    /// The archive is synced to disk before returning so that callers may
    /// safely delete the source afterwards.
    #[instrument(skip(self), fields(format = %self))]
    pub fn archive_file(&self, source: &Path, target: &Path) -> Result<u64> {
        let name = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_raise(|| ErrorKind::InvalidName(source.display().to_string()))?;
        let input = File::open(source).or_raise(|| ErrorKind::Io)?;
        let size = input.metadata().or_raise(|| ErrorKind::Io)?.len();
        let output = BufWriter::new(File::create(target).or_raise(|| ErrorKind::Io)?);
        let (bytes, mut output) = self.archive_stream(name, BufReader::new(input), output, size)?;
        output.flush().or_raise(|| ErrorKind::Io)?;
        output.get_ref().sync_all().or_raise(|| ErrorKind::Io)?;
        Ok(bytes)
    }
}

/// Read back the only entry of a single-entry archive, returning its name and
/// its decompressed content.
///
/// Archives that are corrupt, or that contain anything other than exactly one
/// entry, are rejected with [`ErrorKind::InvalidData`].
pub fn read_single_entry<R: Read + Seek>(reader: R) -> Result<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(reader).or_raise(|| ErrorKind::InvalidData)?;
    if archive.len() != 1 {
        exn::bail!(ErrorKind::InvalidData);
    }
    let mut entry = archive.by_index(0).or_raise(|| ErrorKind::InvalidData)?;
    let name = entry.name().to_string();
    let mut content = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
    entry.read_to_end(&mut content).or_raise(|| ErrorKind::InvalidData)?;
    Ok((name, content))
}
