//! Date placeholders in transfer patterns.
//!
//! A pattern may contain `YYYYMMDD` or `YYMMDD`, replaced by today's date or
//! by a date given on the command line. The long placeholder is checked
//! first since it contains the short one.

use crate::transfer::error::{ErrorKind, Result};
use std::borrow::Cow;
use time::Date;

const LONG: &str = "YYYYMMDD";
const SHORT: &str = "YYMMDD";

/// A pattern with its placeholder filled in, and the date used to do so.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPattern {
    pub pattern: String,
    /// The substituted date. Without a placeholder this is the explicit date
    /// verbatim, or today as `YYYYMMDD`.
    pub date: String,
}

/// Prefix a `YYMMDD` date with its century. Two-digit years above `50` are
/// taken as 19xx, everything else as 20xx. The comparison is on the
/// characters, not the number.
///
/// ```
/// # use keeper_jobs::transfer::date::expand_century;
/// assert_eq!(expand_century("241231"), "20241231");
/// assert_eq!(expand_century("501231"), "20501231");
/// assert_eq!(expand_century("511231"), "19511231");
/// ```
pub fn expand_century(date: &str) -> String {
    let century = if date.get(..2).is_some_and(|year| year > "50") { "19" } else { "20" };
    format!("{century}{date}")
}

/// The date a transfer is checked against in the registry: six characters
/// get their century, anything else is kept.
pub fn registry_date(date: &str) -> Cow<'_, str> {
    if date.len() == 6 { Cow::Owned(expand_century(date)) } else { Cow::Borrowed(date) }
}

fn long(date: Date) -> String {
    format!("{:04}{:02}{:02}", date.year(), u8::from(date.month()), date.day())
}

fn short(date: Date) -> String {
    format!("{:02}{:02}{:02}", date.year().rem_euclid(100), u8::from(date.month()), date.day())
}

/// Fill the date placeholder of `pattern` from `explicit`, or from `today`
/// when no date was given.
///
/// An explicit date must be six or eight characters long when the pattern
/// has a placeholder; it is converted to the placeholder's width.
pub fn resolve(pattern: &str, explicit: Option<&str>, today: Date) -> Result<ResolvedPattern> {
    let (placeholder, date) = if pattern.contains(LONG) {
        let date = match explicit {
            None => long(today),
            Some(date) if date.len() == 8 => date.to_string(),
            Some(date) if date.len() == 6 => expand_century(date),
            Some(date) => exn::bail!(ErrorKind::InvalidDate(date.to_string())),
        };
        (Some(LONG), date)
    } else if pattern.contains(SHORT) {
        let date = match explicit {
            None => short(today),
            Some(date) if date.len() == 6 => date.to_string(),
            Some(date) if date.len() == 8 => match date.get(2..) {
                Some(tail) => tail.to_string(),
                None => exn::bail!(ErrorKind::InvalidDate(date.to_string())),
            },
            Some(date) => exn::bail!(ErrorKind::InvalidDate(date.to_string())),
        };
        (Some(SHORT), date)
    } else {
        (None, explicit.map_or_else(|| long(today), str::to_string))
    };
    let pattern = match placeholder {
        Some(placeholder) => pattern.replace(placeholder, &date),
        None => pattern.to_string(),
    };
    Ok(ResolvedPattern { pattern, date })
}
