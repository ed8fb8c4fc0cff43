//! Modification-time queries over files.
//!
//! Timestamps are [`SystemTime`] values compared directly; nothing here
//! reads file content. Freshness decisions built on these queries (see
//! [`crate::combine`]) are therefore timestamp-only: content that
//! changes without the timestamp moving forward is not detected.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::error::{FileweaveError, Result};
use crate::expand::{expand_path, expand_str};

/// Return the modification time of a file.
///
/// The path is expanded first; a missing file is
/// [`FileweaveError::MissingFile`].
pub fn modified(path: impl AsRef<str>) -> Result<SystemTime> {
    let full = expand_path(path.as_ref());
    mtime(&full)
}

fn mtime(full: &Path) -> Result<SystemTime> {
    let metadata = fs::metadata(full).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => FileweaveError::missing_file(full),
        _ => FileweaveError::file_read(full, e),
    })?;
    metadata.modified().map_err(|e| FileweaveError::file_read(full, e))
}

/// Return the given paths sorted into modification order, oldest first.
///
/// The sort is stable, so paths with equal timestamps keep their input
/// order. Any missing path is [`FileweaveError::MissingFile`].
pub fn in_modification_order(paths: &[impl AsRef<str>]) -> Result<Vec<PathBuf>> {
    let mut stamped = Vec::with_capacity(paths.len());
    for path in paths {
        let full = expand_path(path.as_ref());
        let time = mtime(&full)?;
        stamped.push((time, full));
    }
    stamped.sort_by_key(|(time, _)| *time);
    Ok(stamped.into_iter().map(|(_, path)| path).collect())
}

/// Return the most recently modified of an explicit list of paths.
///
/// Ties go to the path listed last among the newest. An empty list is
/// [`FileweaveError::NoMatches`].
pub fn most_recently_modified(paths: &[impl AsRef<str>]) -> Result<PathBuf> {
    if paths.is_empty() {
        return Err(FileweaveError::no_matches("an empty path list"));
    }
    let ordered = in_modification_order(paths)?;
    Ok(ordered.into_iter().next_back().unwrap_or_default())
}

/// Return the most recently modified file matching a glob pattern.
///
/// The pattern is expanded like any other path before matching. A
/// pattern matching nothing is [`FileweaveError::NoMatches`].
pub fn most_recently_modified_matching(pattern: &str) -> Result<PathBuf> {
    let full_pattern = expand_str(pattern);
    let matches = glob::glob(&full_pattern)
        .map_err(|e| FileweaveError::invalid_pattern(full_pattern.as_str(), e))?
        .filter_map(|entry| entry.ok())
        .collect::<Vec<_>>();
    debug!("pattern {} matched {} paths", full_pattern, matches.len());
    if matches.is_empty() {
        return Err(FileweaveError::no_matches(format!(
            "pattern '{full_pattern}'"
        )));
    }

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for path in matches {
        let time = mtime(&path)?;
        // >= keeps the later-enumerated path on a tie, matching the
        // explicit-list entry point.
        if newest.as_ref().map_or(true, |(best, _)| time >= *best) {
            newest = Some((time, path));
        }
    }
    Ok(newest.map(|(_, path)| path).unwrap_or_default())
}
