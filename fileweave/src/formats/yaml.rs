//! YAML reading and writing.
//!
//! Documents decode into the same value shape the JSON codec produces,
//! so downstream code handles both formats uniformly. Parsing is safe:
//! no tags are resolved to anything executable. A document whose
//! structure cannot be represented that way (a mapping with non-string
//! keys) fails to decode.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{FileweaveError, Result};

/// Registry decoder: parse the whole file as one YAML document.
pub(crate) fn read(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|e| FileweaveError::file_read(path, e))?;
    serde_yaml::from_str(&text).map_err(|e| FileweaveError::malformed(path, e))
}

/// Registry encoder.
pub(crate) fn write(path: &Path, content: &Value) -> Result<()> {
    let text = serde_yaml::to_string(content).map_err(|e| FileweaveError::malformed(path, e))?;
    fs::write(path, text).map_err(|e| FileweaveError::file_write(path, e))
}
