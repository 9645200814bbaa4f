//! Glob expansion relative to a directory.
//!
//! Patterns are matched one path component at a time, so `*` never crosses
//! a separator: `*.log` only matches files directly inside the directory,
//! while `*/app.log` looks exactly one level down. Components without glob
//! syntax are joined as-is. Matches within a directory are sorted by name.
//! Unreadable directories contribute no matches rather than an error; only
//! a pattern that fails to compile is an error, and it is detected before
//! touching the filesystem.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use globset::{Glob, GlobMatcher};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

enum Segment {
    Literal(OsString),
    Parent,
    Wildcard(GlobMatcher),
}

fn has_glob_syntax(part: &str) -> bool {
    part.contains(['*', '?', '[', '{'])
}

fn compile(pattern: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    for component in Path::new(pattern).components() {
        match component {
            Component::Normal(part) => match part.to_str().filter(|p| has_glob_syntax(p)) {
                Some(part) => {
                    let glob = Glob::new(part).or_raise(|| ErrorKind::InvalidPattern(pattern.to_string()))?;
                    segments.push(Segment::Wildcard(glob.compile_matcher()));
                },
                None => segments.push(Segment::Literal(part.to_os_string())),
            },
            Component::ParentDir => segments.push(Segment::Parent),
            // Patterns are always relative to the search directory.
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPattern(pattern.to_string())),
        }
    }
    Ok(segments)
}

async fn matching_entries(dir: &Path, matcher: &GlobMatcher) -> Vec<PathBuf> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) => {
            tracing::trace!(dir = %dir.display(), error = %err, "Skipping unreadable directory during glob");
            return vec![];
        },
    };
    let mut names = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                let name = entry.file_name();
                if matcher.is_match(Path::new(&name)) {
                    names.push(name);
                }
            },
            Ok(None) => break,
            Err(err) => {
                tracing::trace!(dir = %dir.display(), error = %err, "Stopped reading directory during glob");
                break;
            },
        }
    }
    names.sort();
    names.into_iter().map(|name| dir.join(name)).collect()
}

/// Expand `pattern` relative to `root`, returning every existing path that
/// matches.
pub(crate) async fn expand(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let segments = compile(pattern)?;
    let mut candidates = vec![root.to_path_buf()];
    for segment in &segments {
        match segment {
            Segment::Literal(part) => candidates.iter_mut().for_each(|c| c.push(part)),
            Segment::Parent => candidates.iter_mut().for_each(|c| c.push("..")),
            Segment::Wildcard(matcher) => {
                let mut matched = Vec::new();
                for dir in &candidates {
                    matched.extend(matching_entries(dir, matcher).await);
                }
                candidates = matched;
            },
        }
        if candidates.is_empty() {
            break;
        }
    }
    // Literal segments were joined without looking; only keep what exists.
    let mut found = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if fs::symlink_metadata(&candidate).await.is_ok() {
            found.push(candidate);
        }
    }
    Ok(found)
}
