//! Path utilities.
//!
//! Files handed between jobs are addressed by their base name only: an
//! archive is named after the file it contains, and a transferred file keeps
//! its name in the destination directory. These helpers make sure that name
//! can never smuggle in extra path components.

use std::path::{Component, Path, PathBuf};
use time::Date;

use crate::error::{ErrorKind, Result};

/// Returns the base name of `path` as UTF-8.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use keeper_storage::file_name;
/// assert_eq!(file_name(Path::new("/var/log/app.log")).unwrap(), "app.log");
/// assert!(file_name(Path::new("/")).is_err());
/// assert!(file_name(Path::new("logs/..")).is_err());
/// ```
pub fn file_name(path: &Path) -> Result<&str> {
    match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => validate_file_name(name),
        None => exn::bail!(ErrorKind::InvalidPath(path.to_path_buf())),
    }
}

/// Validates that `name` is exactly one normal path component, so that
/// joining it onto a directory can never leave that directory.
///
/// > **Note:** Null bytes pass through [`Path::components()`] on Unix but
/// >           truncate C-based syscalls, so they are rejected explicitly.
///
/// # Examples
///
/// ```
/// use keeper_storage::validate_file_name;
/// assert!(validate_file_name("report_20241231.csv").is_ok());
/// assert!(validate_file_name("../etc/passwd").is_err());
/// assert!(validate_file_name("a/b").is_err());
/// assert!(validate_file_name("").is_err());
/// ```
pub fn validate_file_name(name: &str) -> Result<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if !part.as_encoded_bytes().contains(&0) => Ok(name),
        _ => exn::bail!(ErrorKind::InvalidPath(PathBuf::from(name))),
    }
}

/// Dated backup folder for `date` under `root`, laid out as `root/YYYY/MM/DD`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use time::macros::date;
/// use keeper_storage::dated_folder;
/// assert_eq!(dated_folder(Path::new("/backup"), date!(2024-03-07)), Path::new("/backup/2024/03/07"));
/// ```
pub fn dated_folder(root: &Path, date: Date) -> PathBuf {
    root.join(format!("{:04}", date.year()))
        .join(format!("{:02}", u8::from(date.month())))
        .join(format!("{:02}", date.day()))
}
