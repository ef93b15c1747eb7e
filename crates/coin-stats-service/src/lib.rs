//! # coin-stats-service
//!
//! A snapshot-owning front for the coin statistics engines.
//!
//! [`CoinStatsService`] keeps the current dataset, answers aggregation and coverage
//! queries through memoising engines, and tells listeners when the dataset changes.
//! The coverage catalog can be read straight from a GeoJSON layer.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::fs::File;
//! use coin_stats::VariableCatalog;
//! use coin_stats_engine::{AggregationRequest, CoverageQuery, Side};
//! use coin_stats_service::{CoinStatsService, ServiceConfig};
//!
//! let layer = File::open("geojson/mint.json")?;
//! let service = CoinStatsService::from_geojson(
//!     ServiceConfig::default(),
//!     VariableCatalog::coins(),
//!     layer,
//! )?;
//!
//! service.refresh_from_json(File::open("coins.json")?)?;
//!
//! let table = service.aggregate(&AggregationRequest::from_parts("year", "QTTYcoins", "MINT"))?;
//! let coverage = service.coverage(&CoverageQuery::new(Side::Primary, "Holland"))?;
//! println!("{}", service.stats());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod events;
mod geojson;
mod service;

// Public re-exports
pub use error::{ServiceError, ServiceResult};
pub use events::{DataEvent, EventBus};
pub use geojson::{load_features, ExclusionRules};
pub use service::{CoinStatsService, ServiceConfig, ServiceStats};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        let _: Option<ServiceConfig> = None;
        let _: Option<ServiceStats> = None;
        let _: Option<DataEvent> = None;
        let _: Option<ServiceResult<()>> = None;
    }

    #[test]
    fn test_service_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CoinStatsService>();
        assert_send_sync::<EventBus>();
    }
}
