//! Error types for file loading, saving, and recombination.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using FileweaveError.
pub type Result<T> = std::result::Result<T, FileweaveError>;

/// Errors that can occur while reading, writing, or combining files.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FileweaveError {
    /// A path that was required to exist does not.
    #[error("file not found: '{path}'")]
    MissingFile { path: PathBuf },

    /// The path's extension has no registered codec.
    #[error("unrecognized extension '.{extension}' for '{path}' (recognized: {recognized})")]
    UnsupportedFormat {
        path: PathBuf,
        extension: String,
        recognized: String,
    },

    /// A glob pattern, or an explicit path list, resolved to nothing.
    #[error("no files matched {selector}")]
    NoMatches { selector: String },

    /// Content of a recognized format failed to decode, or has a shape
    /// the requested operation cannot work with.
    #[error("malformed content in '{path}': {detail}")]
    MalformedContent { path: PathBuf, detail: String },

    /// Glob pattern failed to parse.
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Failed to read a file.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a directory.
    #[error("failed to create directory '{path}': {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileweaveError {
    /// Create a MissingFile error.
    pub fn missing_file(path: impl Into<PathBuf>) -> Self {
        Self::MissingFile { path: path.into() }
    }

    /// Create a NoMatches error.
    pub fn no_matches(selector: impl Into<String>) -> Self {
        Self::NoMatches {
            selector: selector.into(),
        }
    }

    /// Create a MalformedContent error from any decode diagnostic.
    pub fn malformed(path: impl Into<PathBuf>, detail: impl std::fmt::Display) -> Self {
        Self::MalformedContent {
            path: path.into(),
            detail: detail.to_string(),
        }
    }

    /// Create an InvalidPattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, source: glob::PatternError) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create a FileRead error.
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Create a FileWrite error.
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a DirectoryCreation error.
    pub fn directory_creation(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreation {
            path: path.into(),
            source,
        }
    }
}
