//! Error types for the service crate.

use coin_stats::DataError;
use coin_stats_engine::EngineError;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors that can occur while loading data or answering queries.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Aggregation or coverage failure.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// Malformed records or catalog entries.
    #[error("data error: {0}")]
    Data(#[from] DataError),

    /// Unreadable JSON or GeoJSON input.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_engine() {
        let err: ServiceError = EngineError::UnsupportedMode("selected year".to_string()).into();
        assert!(matches!(err, ServiceError::Engine(_)));
        assert_eq!(
            err.to_string(),
            "engine error: unsupported coverage mode: selected year"
        );
    }

    #[test]
    fn test_error_from_json() {
        let err: ServiceError = serde_json::from_str::<Vec<u8>>("{").unwrap_err().into();
        assert!(err.to_string().starts_with("JSON error:"));
    }
}
