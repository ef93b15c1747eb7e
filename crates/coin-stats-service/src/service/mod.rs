//! Statistics service owning the current dataset snapshot.
//!
//! The service holds the variable catalog, the coverage catalog and the current
//! snapshot, answers aggregation and coverage queries through memoising engines, and
//! notifies listeners whenever the snapshot is replaced.
//!
//! # Example
//!
//! ```ignore
//! use coin_stats_service::{CoinStatsService, DataEvent, ServiceConfig};
//!
//! let service = CoinStatsService::from_geojson(ServiceConfig::default(), catalog, layer)?;
//! service.subscribe(|event| {
//!     if let DataEvent::DataReady { records, .. } = event {
//!         println!("{records} records ready");
//!     }
//! });
//!
//! service.refresh(records);
//! let table = service.aggregate(&AggregationRequest::from_parts("year", "QTTYcoins", "MINT"))?;
//! let ticks = service.ticks(&table);
//! ```

mod types;

pub use types::{ServiceConfig, ServiceStats};

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::sync::Arc;

use coin_stats::{Record, VariableCatalog};
use coin_stats_engine::{
    axis_labels, distinct_values, missing_data, ticks, year_bounds, AggregateTable,
    AggregationEngine, AggregationRequest, AxisLabels, CoverageCatalog, CoverageEngine,
    CoverageQuery, CoverageResult, Dataset, DatasetSnapshot, MissingDataReport,
};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::ServiceResult;
use crate::events::{DataEvent, EventBus};
use crate::geojson::load_features;

/// Answers chart queries over the current coin dataset.
#[derive(Debug)]
pub struct CoinStatsService {
    catalog: Arc<VariableCatalog>,
    aggregation: AggregationEngine,
    coverage: CoverageEngine,
    dataset: RwLock<Arc<Dataset>>,
    events: EventBus,
    stats: RwLock<ServiceStats>,
    config: ServiceConfig,
}

impl CoinStatsService {
    /// Creates a service with an empty dataset and publishes [`DataEvent::Initialized`].
    pub fn new(
        config: ServiceConfig,
        catalog: VariableCatalog,
        coverage_catalog: CoverageCatalog,
    ) -> Self {
        Self::with_events(config, catalog, coverage_catalog, EventBus::new())
    }

    /// Creates a service publishing to an existing bus, so its listeners see
    /// [`DataEvent::Initialized`].
    pub fn with_events(
        config: ServiceConfig,
        catalog: VariableCatalog,
        coverage_catalog: CoverageCatalog,
        events: EventBus,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let aggregation = AggregationEngine::with_config(Arc::clone(&catalog), config.engine.clone());
        let coverage = CoverageEngine::with_config(Arc::new(coverage_catalog), config.engine.clone());

        let service = Self {
            catalog,
            aggregation,
            coverage,
            dataset: RwLock::new(Arc::new(Dataset::default())),
            events,
            stats: RwLock::new(ServiceStats::default()),
            config,
        };
        info!(fields = service.catalog.len(), "coin statistics service initialized");
        service.events.publish(&DataEvent::Initialized);
        service
    }

    /// Creates a service whose coverage catalog is read from a GeoJSON layer.
    ///
    /// Exclusion rules, when configured, are applied before the catalog is built.
    pub fn from_geojson(
        config: ServiceConfig,
        catalog: VariableCatalog,
        layer: impl Read,
    ) -> ServiceResult<Self> {
        let mut features = load_features(layer)?;
        if let Some(rules) = &config.exclusions {
            features = rules.filter(features);
        }
        let coverage_catalog =
            CoverageCatalog::build(features, &config.primary_field, &config.secondary_field)?;
        Ok(Self::new(config, catalog, coverage_catalog))
    }

    /// Registers a dataset listener.
    pub fn subscribe(&self, listener: impl Fn(&DataEvent) + Send + Sync + 'static) {
        self.events.subscribe(listener);
    }

    /// Replaces the dataset and returns the new generation.
    ///
    /// Both memos are cleared; listeners receive [`DataEvent::Refreshing`] before the
    /// swap and [`DataEvent::DataReady`] after it.
    pub fn refresh(&self, records: Vec<Record>) -> u64 {
        self.events.publish(&DataEvent::Refreshing);

        let (generation, count) = {
            let mut current = self.dataset.write();
            let next = current.next(records);
            let generation = next.generation();
            let count = next.len();
            *current = Arc::new(next);
            (generation, count)
        };
        self.aggregation.invalidate();
        self.coverage.invalidate();
        self.stats.write().refreshes += 1;

        info!(generation, records = count, "dataset refreshed");
        self.events.publish(&DataEvent::DataReady {
            generation,
            records: count,
        });
        generation
    }

    /// Replaces the dataset with records read from a JSON array.
    pub fn refresh_from_json(&self, reader: impl Read) -> ServiceResult<u64> {
        let records: Vec<Record> = serde_json::from_reader(reader)?;
        Ok(self.refresh(records))
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Dataset> {
        Arc::clone(&self.dataset.read())
    }

    /// Aggregates the current snapshot.
    pub fn aggregate(&self, request: &AggregationRequest) -> ServiceResult<AggregateTable> {
        let snapshot = self.snapshot();
        let table = self.aggregation.aggregate(&*snapshot, request)?;
        self.record_query(table.stats.cache_hit);
        debug!(request = %request, rows = table.len(), "aggregate answered");
        Ok(table)
    }

    /// Computes coverage over the current snapshot.
    pub fn coverage(&self, query: &CoverageQuery) -> ServiceResult<CoverageResult> {
        let snapshot = self.snapshot();
        let result = self.coverage.coverage(&*snapshot, query)?;
        self.record_query(result.stats.cache_hit);
        Ok(result)
    }

    /// Year-axis ticks for a table.
    pub fn ticks(&self, table: &AggregateTable) -> Vec<i32> {
        ticks(table.years())
    }

    /// Chart axis titles for a request.
    pub fn axis_labels(&self, request: &AggregationRequest) -> AxisLabels {
        axis_labels(request, &self.catalog)
    }

    /// Missing values per catalog field in the current snapshot.
    pub fn missing_data(&self) -> MissingDataReport {
        missing_data(self.snapshot().records(), &self.catalog)
    }

    /// Distinct values of the text fields in the current snapshot.
    pub fn distinct_values(&self) -> BTreeMap<String, BTreeSet<String>> {
        distinct_values(self.snapshot().records(), &self.catalog)
    }

    /// Earliest and latest year of the current snapshot.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        year_bounds(self.snapshot().records())
    }

    /// Returns usage statistics.
    pub fn stats(&self) -> ServiceStats {
        self.stats.read().clone()
    }

    /// Resets statistics.
    pub fn reset_stats(&self) {
        *self.stats.write() = ServiceStats::default();
    }

    /// The variable catalog.
    pub fn catalog(&self) -> &VariableCatalog {
        &self.catalog
    }

    /// The coverage catalog.
    pub fn coverage_catalog(&self) -> &CoverageCatalog {
        self.coverage.catalog()
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn record_query(&self, cache_hit: bool) {
        let mut stats = self.stats.write();
        stats.queries += 1;
        if cache_hit {
            stats.cache_hits += 1;
        } else {
            stats.cache_misses += 1;
        }
    }
}
