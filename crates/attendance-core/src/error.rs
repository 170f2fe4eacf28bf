use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the attendance engine.
#[derive(Error, Debug)]
pub enum AttendanceError {
    /// A file identifier did not match any accepted date encoding.
    #[error("Could not resolve a date from file name: {identifier}")]
    DateFormat { identifier: String },

    /// An analysis needs columns the day file does not provide.
    #[error("Missing columns for {analysis}: {}", missing.join(", "))]
    MissingColumns {
        analysis: &'static str,
        missing: Vec<String>,
    },

    /// A punch time could not be parsed as `HH:MM:SS`.
    #[error("Invalid punch time: {0}")]
    UnparsableTime(String),

    /// A source file could not be opened or parsed as tabular data.
    #[error("Failed to read attendance file {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A view needs data the directory does not hold.
    #[error("No {what} found under {path}")]
    NoData { what: &'static str, path: PathBuf },

    /// A location filter was constructed with no accepted values.
    #[error("Invalid filter for {axis}: {reason}")]
    InvalidFilter { axis: &'static str, reason: String },

    /// A report could not be written by the sink.
    #[error("Failed to export report to {path}: {reason}")]
    Export { path: PathBuf, reason: String },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A JSON document could not be parsed or produced.
    #[error("Failed to process JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the attendance crates.
pub type Result<T> = std::result::Result<T, AttendanceError>;
