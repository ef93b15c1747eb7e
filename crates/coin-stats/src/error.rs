//! Error types for the coin data model.

use thiserror::Error;

/// Errors raised while building records, dates and catalog spans.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// A `{year, month, day}` triple that is not a calendar date.
    #[error("invalid date: {year}-{month}-{day}")]
    InvalidDate {
        /// Year component.
        year: i32,
        /// Month component.
        month: u32,
        /// Day component.
        day: u32,
    },

    /// A date string that could not be parsed.
    #[error("parse error at position {position}: {message}")]
    ParseError {
        /// Position in the input where the error occurred.
        position: usize,
        /// Description of the error.
        message: String,
    },

    /// Empty input where a value was required.
    #[error("empty input")]
    EmptyInput,

    /// A span whose end lies before its start.
    #[error("date span ends before it starts: {from} > {to}")]
    InvertedSpan {
        /// Rendered start date.
        from: String,
        /// Rendered end date.
        to: String,
    },

    /// A field holding a value of the wrong shape.
    #[error("invalid value for field {field}: {message}")]
    InvalidField {
        /// Field name.
        field: String,
        /// Description of the problem.
        message: String,
    },

    /// Malformed JSON input.
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Json(err.to_string())
    }
}

/// Result type for data model operations.
pub type DataResult<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_date() {
        let err = DataError::InvalidDate {
            year: 1401,
            month: 2,
            day: 30,
        };
        assert_eq!(err.to_string(), "invalid date: 1401-2-30");
    }

    #[test]
    fn test_error_display_inverted_span() {
        let err = DataError::InvertedSpan {
            from: "1410-01-01".to_string(),
            to: "1400-01-01".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "date span ends before it starts: 1410-01-01 > 1400-01-01"
        );
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: DataError = json_err.into();
        assert!(matches!(err, DataError::Json(_)));
    }
}
