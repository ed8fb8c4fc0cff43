//! Freshness-gated recombination of derived files.
//!
//! [`combined`] regenerates a destination file from a set of origin
//! files only when an origin has been modified more recently than the
//! destination; otherwise the destination is simply read back. The
//! comparison uses modification timestamps only, never content, so an
//! origin rewritten with its timestamp held back goes unnoticed. This
//! is a documented limitation.
//!
//! [`cached_in_file`] is the degenerate single-file form: compute once,
//! keep the result in a file, replay it from there afterwards.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::error::{FileweaveError, Result};
use crate::expand::expand_path;
use crate::formats::{load, save};
use crate::freshness::modified;

/// Transform applied to each record loaded from one origin file.
pub type RecordTransform = Box<dyn Fn(Value) -> Value>;

/// An insertion-ordered set of origin files, each with the transform to
/// apply to its records.
///
/// Iteration order is insertion order, so a single [`combined`] call
/// always hands the combiner its per-origin sequences in the same
/// order.
#[derive(Default)]
pub struct Origins {
    entries: IndexMap<String, RecordTransform>,
}

impl Origins {
    /// Create an empty origin set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an origin file with its record transform.
    pub fn add(&mut self, path: impl Into<String>, transform: impl Fn(Value) -> Value + 'static) {
        self.entries.insert(path.into(), Box::new(transform));
    }

    /// Builder form of [`add`](Self::add).
    pub fn with(
        mut self,
        path: impl Into<String>,
        transform: impl Fn(Value) -> Value + 'static,
    ) -> Self {
        self.add(path, transform);
        self
    }

    /// Number of origins.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The origin paths, in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Regenerate `destination` from the origin files if any of them has
/// been modified since the destination was, and return the regenerated
/// content; otherwise read and return the destination as it stands.
///
/// Regeneration loads every origin, maps each of its records through
/// that origin's transform, hands the per-origin sequences to
/// `combiner` in origin-set order, and saves the combiner's result to
/// the destination. All loads and the combiner run before anything is
/// written, so a failing origin leaves the destination untouched.
/// Origins are never written to, and the destination is written at most
/// once per call.
///
/// A destination that does not yet exist is treated as older than every
/// origin, so the first call populates it. A missing origin is
/// [`FileweaveError::MissingFile`]; an empty origin set is
/// [`FileweaveError::NoMatches`].
pub fn combined<F>(destination: impl AsRef<str>, combiner: F, origins: &Origins) -> Result<Value>
where
    F: FnOnce(Vec<Vec<Value>>) -> Value,
{
    let destination = destination.as_ref();
    if origins.is_empty() {
        return Err(FileweaveError::no_matches("an empty origin set"));
    }

    let mut newest_origin = None;
    for path in origins.paths() {
        let time = modified(path)?;
        if newest_origin.map_or(true, |best| time > best) {
            newest_origin = Some(time);
        }
    }
    // Checked above that the set is non-empty.
    let newest_origin = newest_origin.unwrap_or(std::time::SystemTime::UNIX_EPOCH);

    let destination_time = match modified(destination) {
        Ok(time) => Some(time),
        // First run: nothing to be fresher than.
        Err(FileweaveError::MissingFile { .. }) => None,
        Err(other) => return Err(other),
    };

    let fresh = destination_time.map_or(false, |time| time >= newest_origin);
    if fresh {
        debug!("reusing {destination}");
        return load(destination);
    }

    debug!("regenerating {destination} from {} origins", origins.len());
    let mut per_origin = Vec::with_capacity(origins.len());
    for (path, transform) in &origins.entries {
        let content = load(path)?;
        let records = match content {
            Value::Array(records) => records,
            other => {
                return Err(FileweaveError::malformed(
                    expand_path(path),
                    format!("expected a sequence of records, got {other}"),
                ))
            }
        };
        per_origin.push(records.into_iter().map(transform).collect());
    }
    save(destination, combiner(per_origin))
}

/// Read a file and return its contents; if the file does not exist, run
/// `compute`, save its result to the file, and return it.
pub fn cached_in_file<F>(path: impl AsRef<str>, compute: F) -> Result<Value>
where
    F: FnOnce() -> Value,
{
    let path = path.as_ref();
    if expand_path(path).exists() {
        debug!("replaying {path}");
        load(path)
    } else {
        debug!("computing {path}");
        save(path, compute())
    }
}
