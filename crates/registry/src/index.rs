use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// Normalizes a date to the `YYYY-MM-DD` form used as the per-date lookup
/// key. Eight-character dates (`YYYYMMDD`) are split with dashes; anything
/// else is returned as-is.
///
/// ```
/// use keeper_registry::date_key;
/// assert_eq!(date_key("20241231"), "2024-12-31");
/// assert_eq!(date_key("2024-12-31"), "2024-12-31");
/// assert_eq!(date_key("241231"), "241231");
/// ```
pub fn date_key(date: &str) -> Cow<'_, str> {
    match (date.len(), date.get(..4), date.get(4..6), date.get(6..)) {
        (8, Some(year), Some(month), Some(day)) => Cow::Owned(format!("{year}-{month}-{day}")),
        _ => Cow::Borrowed(date),
    }
}

/// Lookups derived from the log. Only ever grows.
#[derive(Debug, Default)]
pub(crate) struct Index {
    /// `(file_name, job_identity)` pairs.
    by_job: HashSet<(String, String)>,
    /// `YYYY-MM-DD` to the file names recorded on that day.
    by_date: HashMap<String, HashSet<String>>,
    rows: usize,
}
impl Index {
    /// Record one row. The date is taken from the first ten characters of the
    /// timestamp; shorter timestamps only count towards the per-job lookup.
    pub(crate) fn insert(&mut self, timestamp: &str, job_identity: &str, file_name: &str) {
        self.by_job.insert((file_name.to_string(), job_identity.to_string()));
        if let Some(date) = timestamp.get(..10) {
            self.by_date.entry(date.to_string()).or_default().insert(file_name.to_string());
        }
        self.rows += 1;
    }

    pub(crate) fn contains_job(&self, file_name: &str, job_identity: &str) -> bool {
        // Tuple keys can't be borrowed as (&str, &str), hence the allocation.
        self.by_job.contains(&(file_name.to_string(), job_identity.to_string()))
    }

    pub(crate) fn contains_date(&self, file_name: &str, date: &str) -> bool {
        self.by_date.get(date).is_some_and(|files| files.contains(file_name))
    }

    pub(crate) fn rows(&self) -> usize {
        self.rows
    }
}
