//! Error types for tabular ingest.

use thiserror::Error;

/// Result type for data operations
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while reading an uploaded data file
#[derive(Debug, Error)]
pub enum DataError {
    /// The CSV reader rejected the input
    #[error("CSV error: {0}")]
    Csv(String),

    /// The workbook could not be opened or read
    #[error("Workbook error: {0}")]
    Workbook(String),

    /// The workbook has no sheets
    #[error("Workbook contains no sheets")]
    NoSheets,

    /// No header row was found
    #[error("Data source is empty")]
    Empty,
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::Csv(err.to_string())
    }
}

impl From<calamine::Error> for DataError {
    fn from(err: calamine::Error) -> Self {
        DataError::Workbook(err.to_string())
    }
}
