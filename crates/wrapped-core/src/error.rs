use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the listening-history pipeline.
#[derive(Error, Debug)]
pub enum WrappedError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file was read but does not contain valid JSON.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An input path does not carry a `.json` extension.
    #[error("{0} is not a JSON file")]
    NotJsonFile(PathBuf),

    /// The batch matches neither the raw-event nor the aggregated-stats shape.
    #[error("Invalid data format: {0}")]
    Format(String),

    /// A custom date range whose start lies after its end.
    #[error("Start date {start} must be before end date {end}")]
    Range { start: String, end: String },

    /// A calendar date string could not be parsed.
    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    /// Date filtering was requested on a pre-aggregated stats file.
    #[error("Date filtering only works with raw streaming history data")]
    FilterUnavailable,

    /// An upload batch contained no files.
    #[error("No input files given")]
    NoInput,

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the wrapped crates.
pub type Result<T> = std::result::Result<T, WrappedError>;
