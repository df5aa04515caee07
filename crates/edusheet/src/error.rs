//! Error types for the edusheet library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for edusheet operations.
#[derive(Debug, Error)]
pub enum EdusheetError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error opening or reading a workbook.
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// Error producing an xlsx file.
    #[error("Xlsx write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Empty file or no header row.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// A column the pipeline needs is absent from the table.
    #[error("Column '{0}' not found")]
    MissingColumn(String),

    /// Table exceeds the limits of the output format.
    #[error("Table too large: {0}")]
    TooLarge(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Network-layer failure talking to the geocoding service.
    #[error("Request error: {0}")]
    Request(String),

    /// The geocoding service answered with something we could not use.
    #[error("Unexpected response: {0}")]
    Response(String),
}

impl EdusheetError {
    /// Wrap an IO error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EdusheetError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from the network layer.
    pub fn is_request(&self) -> bool {
        matches!(self, EdusheetError::Request(_))
    }
}

/// Result type alias for edusheet operations.
pub type Result<T> = std::result::Result<T, EdusheetError>;
