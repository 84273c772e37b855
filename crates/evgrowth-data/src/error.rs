//! Error types for data operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading or caching sales data.
#[derive(Debug, Error)]
pub enum DataError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The configured data file does not exist.
    #[error("Data file not found: {}", .0.display())]
    DataFileNotFound(PathBuf),

    /// A column required by the schema is absent from the header row.
    #[error("Missing required column: {column}")]
    MissingColumn {
        /// Column name the schema expected.
        column: String,
    },

    /// A cell could not be parsed.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        /// 1-based row number in the source file (header is row 1).
        row: usize,
        /// Column name.
        column: String,
        /// What went wrong.
        message: String,
    },

    /// A unit count was negative or not finite.
    #[error("Invalid unit count {value} at row {row}, column {column}")]
    InvalidUnits {
        /// 1-based row number in the source file.
        row: usize,
        /// Column name.
        column: String,
        /// Offending value.
        value: f64,
    },

    /// A period token could not be parsed.
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Fiscal year start month outside 1..=12.
    #[error("Invalid fiscal year start month: {0}")]
    InvalidFiscalStartMonth(u32),
}
