use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the Meterline pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No line of the export contained the expected vendor header.
    #[error("Header line not found, expected: {expected}")]
    HeaderNotFound { expected: String },

    /// The header at a validation checkpoint did not match the expected
    /// ordered column list exactly.
    #[error("Header mismatch: expected [{expected}], found [{actual}]")]
    HeaderMismatch { expected: String, actual: String },

    /// A data row had a field count that fits neither the complete nor the
    /// notes-omitted shape. `row` is 1-based over the data rows.
    #[error("Malformed row {row}: expected 6 or 7 fields, found {found}: {content}")]
    MalformedRow {
        row: usize,
        found: usize,
        content: String,
    },

    /// A wall-clock date or time string could not be converted to epoch
    /// seconds.
    #[error("Invalid timestamp {value:?}: {reason}")]
    Timestamp { value: String, reason: String },

    /// A CSV document could not be parsed.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the meterline crates.
pub type Result<T> = std::result::Result<T, PipelineError>;
