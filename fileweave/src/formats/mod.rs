//! Format-dispatched loading and saving of structured files.
//!
//! Dispatch is by file-extension suffix, through a process-wide registry
//! of decoder/encoder pairs built once and never mutated. Looking up an
//! unregistered extension fails with
//! [`FileweaveError::UnsupportedFormat`] rather than falling back to a
//! default.
//!
//! Writer functions return the content they were given, so they can be
//! used in a passthrough manner.

pub mod csv;
pub mod json;
pub mod yaml;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{FileweaveError, Result};
use crate::expand::expand_path;

/// A decoder/encoder pair registered for one file extension.
struct Codec {
    read: fn(&Path) -> Result<Value>,
    write: fn(&Path, &Value) -> Result<()>,
}

/// Extension registry. `yml` is an alias for the YAML codec.
static CODECS: Lazy<BTreeMap<&'static str, Codec>> = Lazy::new(|| {
    let mut codecs = BTreeMap::new();
    codecs.insert(
        "csv",
        Codec {
            read: csv::read_default,
            write: csv::write_default,
        },
    );
    codecs.insert(
        "json",
        Codec {
            read: json::read,
            write: json::write,
        },
    );
    codecs.insert(
        "yaml",
        Codec {
            read: yaml::read,
            write: yaml::write,
        },
    );
    codecs.insert(
        "yml",
        Codec {
            read: yaml::read,
            write: yaml::write,
        },
    );
    codecs
});

/// Extensions with a registered codec, sorted.
pub fn recognized_extensions() -> Vec<&'static str> {
    CODECS.keys().copied().collect()
}

fn codec_for(path: &Path) -> Result<&'static Codec> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    CODECS
        .get(extension.as_str())
        .ok_or_else(|| FileweaveError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension,
            recognized: recognized_extensions().join(", "),
        })
}

/// Read a file, finding a suitable decoder for its extension.
///
/// The path is expanded first; a missing file is
/// [`FileweaveError::MissingFile`]. Every call re-reads from storage;
/// no content is cached in memory.
pub fn load(path: impl AsRef<str>) -> Result<Value> {
    let full = expand_path(path.as_ref());
    let codec = codec_for(&full)?;
    if !full.exists() {
        return Err(FileweaveError::missing_file(full));
    }
    debug!("loading {}", full.display());
    (codec.read)(&full)
}

/// Write a file, finding a suitable encoder for its extension, and
/// return the content unchanged.
///
/// Missing parent directories are created before writing.
pub fn save(path: impl AsRef<str>, content: Value) -> Result<Value> {
    let full = expand_path(path.as_ref());
    let codec = codec_for(&full)?;
    create_parent_dirs(&full)?;
    debug!("saving {}", full.display());
    (codec.write)(&full, &content)?;
    Ok(content)
}

/// Read a file straight into a deserializable type.
pub fn load_as<T>(path: impl AsRef<str>) -> Result<T>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();
    let value = load(path)?;
    serde_json::from_value(value).map_err(|e| FileweaveError::malformed(expand_path(path), e))
}

/// Write a serializable value to a file and return it unchanged.
pub fn save_as<T>(path: impl AsRef<str>, content: T) -> Result<T>
where
    T: Serialize,
{
    let path = path.as_ref();
    let value = serde_json::to_value(&content)
        .map_err(|e| FileweaveError::malformed(expand_path(path), e))?;
    save(path, value)?;
    Ok(content)
}

/// Create the directory a file is to go into, if necessary.
pub(crate) fn create_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("creating directory {}", parent.display());
            fs::create_dir_all(parent)
                .map_err(|e| FileweaveError::directory_creation(parent, e))?;
        }
    }
    Ok(())
}
