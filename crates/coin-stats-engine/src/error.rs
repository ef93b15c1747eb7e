//! Error types for the statistics engines.

use coin_stats::DataError;
use thiserror::Error;

/// Errors that can occur while aggregating or computing coverage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Malformed input data (dates, catalog spans, field shapes).
    #[error("data error: {0}")]
    Data(#[from] DataError),

    /// A quantity-weighted average over a group whose weights sum to zero.
    #[error("weighted average undefined for {axis} / {category}: total quantity is zero")]
    ZeroWeight {
        /// Axis value of the cell.
        axis: String,
        /// Category label of the cell.
        category: String,
    },

    /// A combination of query options the engine does not support.
    #[error("unsupported coverage mode: {0}")]
    UnsupportedMode(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
