//! Error types for the vantage toolkit.
//!
//! Every failure the core can raise is a variant of [`VantageError`]. None of
//! them are recovered inside the library: a parse failure is never replaced
//! by a zero, an empty response is never replaced by an empty chart.

use crate::Date;
use thiserror::Error;

/// The main error type for vantage operations.
#[derive(Debug, Error)]
pub enum VantageError {
    /// The query window starts after it ends.
    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange {
        /// Requested first day.
        start: Date,
        /// Requested last day.
        end: Date,
    },

    /// A timestamp or value from the provider could not be parsed.
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// The provider's columns do not line up with the requested metrics.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// No usable observations to rank.
    #[error("Empty series: {0}")]
    EmptySeries(String),

    /// Nothing was requested, or the provider returned nothing.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A column named by the caller does not exist in the series.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// An argument supplied by the caller is not understood.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A date supplied by the caller could not be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Error fetching data from the provider.
    #[error("Data fetch error: {0}")]
    DataFetch(String),

    /// Error while producing a chart.
    #[error("Render error: {0}")]
    Render(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// I/O error while writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VantageError {
    /// Builds a [`VantageError::SchemaMismatch`] for a column count disagreement.
    pub fn column_count(expected: usize, actual: usize) -> Self {
        Self::SchemaMismatch(format!(
            "expected {expected} metric column(s), provider returned {actual}"
        ))
    }
}

/// A specialized Result type for vantage operations.
pub type Result<T> = std::result::Result<T, VantageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VantageError::MalformedData("bad timestamp 'x'".to_string());
        assert_eq!(err.to_string(), "Malformed data: bad timestamp 'x'");

        let err = VantageError::MissingColumn("pe_ttm".to_string());
        assert_eq!(err.to_string(), "Missing required column: pe_ttm");
    }

    #[test]
    fn test_invalid_range_display() {
        let err = VantageError::InvalidRange {
            start: Date::from_ymd_opt(2021, 1, 1).unwrap(),
            end: Date::from_ymd_opt(2016, 1, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid range: start 2021-01-01 is after end 2016-01-01"
        );
    }

    #[test]
    fn test_column_count() {
        let err = VantageError::column_count(5, 4);
        assert!(matches!(err, VantageError::SchemaMismatch(_)));
        assert!(err.to_string().contains("expected 5"));
    }
}
