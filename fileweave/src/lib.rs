//! Reading, writing, and recombining structured data files
//!
//! This crate provides format-dispatched loading and saving of CSV, JSON,
//! and YAML files, with environment-variable and `~` expansion applied to
//! every path, and freshness-gated recombination of derived files from
//! their source files.
//!
//! ## Features
//!
//! - **Format dispatch**: [`load`] and [`save`] pick a codec by file
//!   extension; writers return what they wrote for passthrough chaining
//! - **Path expansion**: `$VAR`, `${VAR}`, and a leading `~` are expanded
//!   before any filesystem operation
//! - **CSV layouts**: row sequences, keyed rows, or grouped rows on read;
//!   flattening and column sorting on write
//! - **Freshness queries**: modification-time ordering and most-recent
//!   selection over explicit lists or glob patterns
//! - **Recombination**: [`combined`] regenerates a derived file only when
//!   one of its origins is newer; [`cached_in_file`] computes a value
//!   once and replays it from a file thereafter
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use fileweave::{combined, Origins, Result};
//! use serde_json::Value;
//!
//! fn example() -> Result<Value> {
//!     let origins = Origins::new()
//!         .with("~/incoming/bank.csv", |row| row)
//!         .with("~/incoming/card.csv", |row| row);
//!
//!     // Rebuilt only when an origin file is newer than the merged file.
//!     combined(
//!         "~/finances/merged.csv",
//!         |per_origin| Value::Array(per_origin.into_iter().flatten().collect()),
//!         &origins,
//!     )
//! }
//! ```

mod combine;
mod error;
mod expand;
mod formats;
mod freshness;

// Re-exports
pub use combine::{cached_in_file, combined, Origins, RecordTransform};
pub use error::{FileweaveError, Result};
pub use expand::expand_path;
pub use formats::csv::{read_csv, write_csv, CsvLayout, CsvWriteOptions};
pub use formats::{load, load_as, recognized_extensions, save, save_as};
pub use freshness::{
    in_modification_order, modified, most_recently_modified, most_recently_modified_matching,
};
