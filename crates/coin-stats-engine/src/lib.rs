//! # coin-stats-engine
//!
//! Aggregation, tick planning and coverage over historical coin datasets.
//!
//! This crate computes the tables behind the coin statistics charts from a dataset
//! snapshot and a [`VariableCatalog`](coin_stats::VariableCatalog):
//!
//! - **Aggregation**: group records by year, field value or a single total row, split
//!   by a category, and reduce by sum or quantity-weighted average
//! - **Tick planning**: evenly spaced year ticks for the chart axis
//! - **Coverage**: the share of the claimed activity spans of a value that the records
//!   attest, by year or by day
//! - **Statistics**: missing values, distinct values and the covered years
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use coin_stats::VariableCatalog;
//! use coin_stats_engine::{AggregationEngine, AggregationRequest, Dataset};
//!
//! let dataset = Dataset::new(records);
//! let engine = AggregationEngine::new(Arc::new(VariableCatalog::coins()));
//!
//! // Quantity of coins per year, split by mint
//! let request = AggregationRequest::from_parts("year", "QTTYcoins", "MINT");
//! let table = engine.aggregate(&dataset, &request)?;
//!
//! for (year, cells) in table.rows() {
//!     println!("{year}: {cells:?}");
//! }
//! ```
//!
//! ## With Memoisation
//!
//! ```ignore
//! use coin_stats_engine::{CacheConfig, EngineConfig, ZeroWeightPolicy};
//! use std::time::Duration;
//!
//! let config = EngineConfig::builder()
//!     .with_cache(CacheConfig {
//!         max_entries: 500,
//!         ttl: Duration::from_secs(600),
//!     })
//!     .with_zero_weight(ZeroWeightPolicy::Zero)
//!     .build();
//!
//! let engine = AggregationEngine::with_config(catalog, config);
//! ```
//!
//! Memoised results are keyed by the snapshot generation, so a refreshed dataset never
//! sees tables computed from an older one.
//!
//! ## Coverage
//!
//! ```ignore
//! use coin_stats_engine::{CoverageCatalog, CoverageEngine, CoverageQuery, Side};
//!
//! let catalog = CoverageCatalog::build(features, "AUTHORITY", "MINT")?;
//! let engine = CoverageEngine::new(Arc::new(catalog));
//!
//! let result = engine.coverage(&dataset, &CoverageQuery::new(Side::Primary, "Holland"))?;
//! println!("{}% attested", result.percentage);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod aggregation;
mod cache;
mod config;
mod coverage;
mod dataset;
mod error;
mod labels;
mod request;
mod result;
mod statistics;
mod ticks;

// Public re-exports
pub use aggregation::{aggregate, AggregationEngine, RECORD_COUNT_LABEL};
pub use cache::{cache_key, CacheStats, ResultCache};
pub use config::{CacheConfig, EngineConfig, EngineConfigBuilder, ZeroWeightPolicy};
pub use coverage::{
    coverage, CatalogFeature, CatalogSpan, CoverageCatalog, CoverageEngine, CoverageMode,
    CoveragePart, CoverageQuery, CoverageResult, CoverageStats, Granularity, Side, YEAR_FROM,
    YEAR_TO,
};
pub use dataset::{Dataset, DatasetSnapshot};
pub use error::{EngineError, EngineResult};
pub use labels::{axis_labels, AxisLabels};
pub use request::{AggregationRequest, Axis, CategorySelector, ValueSelector, TOTAL, YEAR};
pub use result::{AggregateTable, AggregationStats, AxisKey};
pub use statistics::{distinct_values, missing_data, year_bounds, MissingDataReport};
pub use ticks::ticks;

// Re-export commonly used types from the model crate for convenience
pub use coin_stats::{Record, VariableCatalog};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        let _: Option<CacheConfig> = None;
        let _: Option<EngineConfig> = None;
        let _: Option<AggregateTable> = None;
        let _: Option<CoverageResult> = None;
        let _: Option<EngineResult<()>> = None;
    }

    #[test]
    fn test_re_exports() {
        let catalog = VariableCatalog::coins();
        let request = AggregationRequest::from_parts(YEAR, TOTAL, "");
        assert!(aggregate(&[], &request, &catalog).unwrap().is_empty());
    }
}
