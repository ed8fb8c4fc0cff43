//! JSON reading and writing.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{FileweaveError, Result};

/// Registry decoder: parse the whole file as one JSON document.
pub(crate) fn read(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|e| FileweaveError::file_read(path, e))?;
    serde_json::from_str(&text).map_err(|e| FileweaveError::malformed(path, e))
}

/// Registry encoder: pretty-printed JSON with a trailing newline.
pub(crate) fn write(path: &Path, content: &Value) -> Result<()> {
    let mut text =
        serde_json::to_string_pretty(content).map_err(|e| FileweaveError::malformed(path, e))?;
    text.push('\n');
    fs::write(path, text).map_err(|e| FileweaveError::file_write(path, e))
}
