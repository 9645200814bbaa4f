//! SQL notification target.

use crate::notify::Notifier;
use crate::notify::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, Executor, SqliteConnection};
use std::str::FromStr;
use std::time::Duration;
use tracing::instrument;

/// Executes each notification statement against an SQLite database.
///
/// A fresh connection is opened, pinged and closed for every statement.
/// Notifications are rare (one per transferred file) and the database may
/// well be unavailable between them.
#[derive(Debug, Clone)]
pub struct SqlNotifier {
    options: SqliteConnectOptions,
}
impl SqlNotifier {
    /// Parse a connection URL such as `sqlite:///var/lib/uploads.db`. The
    /// database must already exist.
    pub fn new(url: &str) -> Result<Self> {
        // Anything without the scheme would be taken as a file name.
        if !url.starts_with("sqlite:") {
            exn::bail!(ErrorKind::InvalidUrl);
        }
        let options = SqliteConnectOptions::from_str(url).or_raise(|| ErrorKind::InvalidUrl)?;
        Ok(Self::with_options(options))
    }

    pub fn with_options(options: SqliteConnectOptions) -> Self {
        Self { options: options.busy_timeout(Duration::from_millis(1500)) }
    }
}

#[async_trait]
impl Notifier for SqlNotifier {
    #[instrument(skip_all)]
    async fn notify(&self, statement: &str) -> Result<()> {
        let mut conn = SqliteConnection::connect_with(&self.options).await.or_raise(|| ErrorKind::Connect)?;
        conn.ping().await.or_raise(|| ErrorKind::Ping)?;
        tracing::debug!(statement, "Executing notification statement");
        let executed = Executor::execute(&mut conn, statement).await.or_raise(|| ErrorKind::Execute);
        // Closing only flushes the connection; the statement has already run.
        _ = conn.close().await;
        executed?;
        Ok(())
    }
}
