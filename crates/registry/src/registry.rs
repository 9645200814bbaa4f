use crate::error::{ErrorKind, Result};
use crate::index::{Index, date_key};
use crate::models::{HEADER, TransferRecord};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use time::PrimitiveDateTime;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::instrument;

/// Durable record of processed files.
///
/// Owned mutably by whoever performs transfers; there is no locking, and
/// concurrent writers to the same log (other processes included) are not
/// supported.
#[derive(Debug)]
pub struct Registry {
    path: PathBuf,
    index: Index,
    dry_run: bool,
}
impl Registry {
    /// Read the log at `path` and rebuild the lookups from it.
    ///
    /// A missing log is an empty registry. The first row is always treated
    /// as the header. Rows that can't be parsed or have fewer than four
    /// fields are skipped with a warning. A log that exists but can't be read
    /// is logged as an error and the registry starts empty, so files it
    /// listed will be transferred again.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>, dry_run: bool) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut index = Index::default();
        let contents = match fs::read(&path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No transfer log yet, starting empty");
                return Self { path, index, dry_run };
            },
            Err(err) => {
                tracing::error!(error = %err, "Cannot read transfer log, starting empty");
                return Self { path, index, dry_run };
            },
        };

        let mut reader = csv::ReaderBuilder::new().has_headers(false).flexible(true).from_reader(contents.as_slice());
        for (line, row) in reader.records().enumerate().skip(1) {
            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    tracing::warn!(line = line + 1, error = %err, "Skipping unreadable row in transfer log");
                    continue;
                },
            };
            match (row.get(0), row.get(1), row.get(2), row.get(3)) {
                (Some(timestamp), Some(job_identity), Some(file_name), Some(_)) => {
                    index.insert(timestamp, job_identity, file_name);
                },
                _ => tracing::warn!(line = line + 1, fields = row.len(), "Skipping short row in transfer log"),
            }
        }
        tracing::info!(records = index.rows(), "Loaded transfer log");
        Self { path, index, dry_run }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records loaded or appended since opening.
    pub fn len(&self) -> usize {
        self.index.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Has `job_identity` already transferred a file called `file_name`?
    pub fn is_processed_by_job(&self, file_name: &str, job_identity: &str) -> bool {
        self.index.contains_job(file_name, job_identity)
    }

    /// Has any job transferred a file called `file_name` on `date`?
    ///
    /// `date` is either `YYYYMMDD` or already `YYYY-MM-DD`; see [`date_key`].
    pub fn is_processed_on_date(&self, file_name: &str, date: &str) -> bool {
        self.index.contains_date(file_name, &date_key(date))
    }

    /// Append one record to the log, synced to disk before returning, and
    /// only then add it to the lookups. A new or empty log gets the header
    /// row first.
    ///
    /// In dry-run mode the record is built and returned but neither the log
    /// nor the lookups change.
    #[instrument(skip(self, destination), fields(destination = %destination.display()))]
    pub async fn append(
        &mut self,
        job_identity: &str,
        file_name: &str,
        destination: &Path,
        at: PrimitiveDateTime,
    ) -> Result<TransferRecord> {
        let record = TransferRecord {
            timestamp: at,
            job_identity: job_identity.to_string(),
            file_name: file_name.to_string(),
            destination: destination.to_path_buf(),
        };
        let row = record.to_row()?;
        if self.dry_run {
            tracing::info!("Skipping transfer log append during dry run");
            return Ok(record);
        }

        let needs_header = match fs::metadata(&self.path).await {
            Ok(metadata) => metadata.len() == 0,
            Err(_) => true,
        };
        let mut writer = csv::Writer::from_writer(Vec::new());
        if needs_header {
            writer.write_record(HEADER).or_raise(|| ErrorKind::InvalidRecord)?;
        }
        writer.write_record(&row).or_raise(|| ErrorKind::InvalidRecord)?;
        let bytes = writer.into_inner().map_err(|e| e.into_error()).or_raise(|| ErrorKind::InvalidRecord)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .or_raise(|| ErrorKind::Write(self.path.clone()))?;
        file.write_all(&bytes).await.or_raise(|| ErrorKind::Write(self.path.clone()))?;
        file.flush().await.or_raise(|| ErrorKind::Write(self.path.clone()))?;
        file.sync_all().await.or_raise(|| ErrorKind::Write(self.path.clone()))?;

        self.index.insert(&row[0], job_identity, file_name);
        Ok(record)
    }
}
