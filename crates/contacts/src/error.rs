//! Error types for the contacts crate.
//!
//! Loading is the only fallible part of the data model. Once contacts and
//! rules are in memory, evaluation never fails.

use thiserror::Error;

/// Errors that can occur while loading contacts, rules or segments from disk.
#[derive(Error, Debug)]
pub enum LoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Whole-document JSON could not be decoded
    #[error("Invalid JSON in {file}: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// A line of a JSON Lines file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// File extension is neither `.json` nor `.jsonl`
    #[error("Unsupported file format for {path} (expected .json or .jsonl)")]
    UnsupportedFormat { path: String },

    /// Two contacts share the same identifier
    #[error("Duplicate contact id: {id}")]
    DuplicateId { id: String },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, LoadError>;
