//! Notification hook.
//!
//! After a transfer has been recorded, a job may hand a statement to a
//! [`Notifier`], typically to insert a row into some other system's database.
//! The statement is the job's template with the transfer's details
//! substituted in; see [`Notification`]. Delivery is best-effort: failures
//! are logged by the caller and never affect the registry.

pub mod error;
mod sql;

pub use self::sql::SqlNotifier;
use crate::notify::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

pub type NotifierHandle = Arc<dyn Notifier + Send + Sync>;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one rendered statement.
    async fn notify(&self, statement: &str) -> Result<()>;
}

/// Placeholder values for a notification template.
#[derive(Debug, Clone, Copy)]
pub struct Notification<'a> {
    /// Replaces `FILENAME`.
    pub file_name: &'a str,
    /// Replaces `NEWFILENAME`. Transfers keep the name, so this is normally
    /// the same as `file_name`.
    pub new_file_name: &'a str,
    /// Replaces `LOCATION`: the job's destination directory.
    pub location: &'a Path,
    /// Replaces `FILESIZE`, in bytes.
    pub file_size: u64,
}
impl Notification<'_> {
    /// Substitute every placeholder in `template`.
    ///
    /// The template is scanned once from left to right, trying the longest
    /// placeholder first at each position, so `NEWFILENAME` is never mistaken
    /// for `FILENAME` and substituted values are never substituted again.
    /// Values are inserted verbatim, without quoting.
    ///
    /// ```
    /// # use keeper_jobs::notify::Notification;
    /// # use std::path::Path;
    /// let notification = Notification {
    ///     file_name: "a.csv",
    ///     new_file_name: "a.csv",
    ///     location: Path::new("/srv/inbox"),
    ///     file_size: 42,
    /// };
    /// assert_eq!(
    ///     notification.render("INSERT INTO uploads VALUES ('FILENAME', 'LOCATION/NEWFILENAME', FILESIZE)"),
    ///     "INSERT INTO uploads VALUES ('a.csv', '/srv/inbox/a.csv', 42)",
    /// );
    /// ```
    pub fn render(&self, template: &str) -> String {
        let location = self.location.to_string_lossy();
        let file_size = self.file_size.to_string();
        let placeholders: [(&str, &str); 4] = [
            ("NEWFILENAME", self.new_file_name),
            ("FILENAME", self.file_name),
            ("LOCATION", location.as_ref()),
            ("FILESIZE", file_size.as_str()),
        ];

        let mut rendered = String::with_capacity(template.len());
        let mut rest = template;
        'scan: while let Some(c) = rest.chars().next() {
            for (placeholder, value) in placeholders {
                if let Some(tail) = rest.strip_prefix(placeholder) {
                    rendered.push_str(value);
                    rest = tail;
                    continue 'scan;
                }
            }
            rendered.push(c);
            rest = &rest[c.len_utf8()..];
        }
        rendered
    }
}
