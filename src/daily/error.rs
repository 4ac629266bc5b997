use chrono::NaiveDate;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DailyDataError {
    /// A line does not follow the fixed-width record layout. Recoverable: the decoder skips
    /// the line and reports it.
    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Input contains no decodable records")]
    EmptyInput,

    /// Only raised under [`crate::DuplicatePolicy::Reject`]; the default policy counts
    /// duplicates instead.
    #[error("Duplicate observation for station '{station}' on {date}, element '{element}'")]
    DuplicateObservation {
        station: String,
        date: NaiveDate,
        element: String,
    },

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Required column '{0}' not found in DataFrame")]
    ColumnNotFound(String, #[source] PolarsError),

    #[error("I/O error writing CSV file '{0}'")]
    CsvWriteIo(PathBuf, #[source] std::io::Error),

    #[error("Failed to read CSV file '{0}'")]
    CsvRead(PathBuf, #[source] PolarsError),

    #[error("Could not resolve the requested dates")]
    DateParsingError,
}
