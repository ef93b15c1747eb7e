//! Axis-grouped aggregation.
//!
//! Every record emits `(axis key, category, contribution, quantity)` tuples. On the
//! year axis a record emits one tuple per calendar year of its span, with the quantity
//! (and, for day-proportional fields, the contribution) scaled by the share of days
//! falling in that year. Tuples are then reduced per cell by sum or by
//! quantity-weighted average.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use coin_stats::record::well_known;
use coin_stats::{AxisScaling, FieldKind, FieldValue, Record, ReductionMode, VariableCatalog};
use tracing::{debug, warn};

use crate::cache::{cache_key, ResultCache};
use crate::config::{EngineConfig, ZeroWeightPolicy};
use crate::dataset::DatasetSnapshot;
use crate::error::{EngineError, EngineResult};
use crate::request::{AggregationRequest, Axis, CategorySelector, ValueSelector, TOTAL};
use crate::result::{AggregateTable, AggregationStats, AxisKey};

/// Category label used when records are counted.
pub const RECORD_COUNT_LABEL: &str = "Number of records";

/// Rounds half-way cases towards positive infinity, like JavaScript's `Math.round`.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Quantity cells are whole coins; every other cell keeps three decimals.
fn round_cell(label: &str, value: f64) -> f64 {
    if label == well_known::QUANTITY {
        round_half_up(value)
    } else {
        round_half_up(value * 1000.0) / 1000.0
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    sum: f64,
    weighted: f64,
    quantity: f64,
}

impl Accumulator {
    fn add(&mut self, contribution: f64, quantity: f64) {
        self.sum += contribution;
        self.weighted += contribution * quantity;
        self.quantity += quantity;
    }
}

/// Aggregation engine with optional per-snapshot memoisation.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use coin_stats::{Record, VariableCatalog};
/// use coin_stats_engine::{AggregationEngine, AggregationRequest, AxisKey, Dataset};
///
/// let dataset = Dataset::new(vec![
///     Record::builder().text("MINT", "A").number("QTTYcoins", 10.0).build().unwrap(),
///     Record::builder().text("MINT", "B").number("QTTYcoins", 5.0).build().unwrap(),
/// ]);
///
/// let engine = AggregationEngine::new(Arc::new(VariableCatalog::coins()));
/// let request = AggregationRequest::from_parts("MINT", "total", "");
/// let table = engine.aggregate(&dataset, &request).unwrap();
///
/// let a = AxisKey::Value("A".to_string());
/// assert_eq!(table.get(&a, "Number of records"), Some(1.0));
/// ```
#[derive(Debug)]
pub struct AggregationEngine {
    catalog: Arc<VariableCatalog>,
    config: EngineConfig,
    cache: Option<ResultCache<AggregateTable>>,
}

impl AggregationEngine {
    /// Creates an engine with default configuration (no memoisation).
    pub fn new(catalog: Arc<VariableCatalog>) -> Self {
        Self::with_config(catalog, EngineConfig::default())
    }

    /// Creates an engine with custom configuration.
    pub fn with_config(catalog: Arc<VariableCatalog>, config: EngineConfig) -> Self {
        let cache = config.cache.clone().map(ResultCache::new);
        Self {
            catalog,
            config,
            cache,
        }
    }

    /// The variable catalog driving reduction and scaling.
    pub fn catalog(&self) -> &VariableCatalog {
        &self.catalog
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The memo, if enabled.
    pub fn cache(&self) -> Option<&ResultCache<AggregateTable>> {
        self.cache.as_ref()
    }

    /// Drops every memoised table.
    pub fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate();
        }
    }

    /// Aggregates a snapshot, answering from the memo when possible.
    ///
    /// # Arguments
    ///
    /// * `dataset` - The snapshot to aggregate; its generation keys the memo
    /// * `request` - Axis, value and category of the chart
    ///
    /// # Returns
    ///
    /// * `Ok(AggregateTable)` - The rounded cells with their aggregation stats
    /// * `Err(EngineError::ZeroWeight)` - If a weighted average has no quantity behind it
    ///   and the engine is configured with `ZeroWeightPolicy::Error`
    pub fn aggregate(
        &self,
        dataset: &dyn DatasetSnapshot,
        request: &AggregationRequest,
    ) -> EngineResult<AggregateTable> {
        let start = Instant::now();
        let parts = request.key_parts();
        let key = cache_key(
            dataset.generation(),
            &[parts[0].as_str(), parts[1].as_str(), parts[2].as_str()],
        );

        if let Some(cache) = &self.cache {
            if let Some(mut table) = cache.get(&key) {
                table.stats.cache_hit = true;
                table.stats.duration = start.elapsed();
                debug!(key = %key, "aggregate served from cache");
                return Ok(table);
            }
        }

        let table = self.aggregate_records(dataset.records(), request)?;
        if let Some(cache) = &self.cache {
            cache.insert(key, table.clone());
        }
        Ok(table)
    }

    /// Aggregates records without touching the memo.
    pub fn aggregate_records(
        &self,
        records: &[Record],
        request: &AggregationRequest,
    ) -> EngineResult<AggregateTable> {
        aggregate_with(records, request, &self.catalog, self.config.zero_weight)
    }
}

/// Aggregates records, failing on zero-weight averages.
///
/// # Errors
///
/// Returns [`EngineError::ZeroWeight`](crate::EngineError::ZeroWeight) when a cell of a
/// weighted-average field has a total quantity of zero.
pub fn aggregate(
    records: &[Record],
    request: &AggregationRequest,
    catalog: &VariableCatalog,
) -> EngineResult<AggregateTable> {
    aggregate_with(records, request, catalog, ZeroWeightPolicy::default())
}

fn aggregate_with(
    records: &[Record],
    request: &AggregationRequest,
    catalog: &VariableCatalog,
    policy: ZeroWeightPolicy,
) -> EngineResult<AggregateTable> {
    let start = Instant::now();
    let descriptor = request.value_field().map(|field| catalog.descriptor(field));
    let reduction = descriptor.map_or(ReductionMode::Sum, |d| d.reduction);
    let scaling = descriptor.map_or(AxisScaling::None, |d| d.scaling);

    let mut groups: BTreeMap<AxisKey, BTreeMap<String, Accumulator>> = BTreeMap::new();
    let mut categories: Vec<String> = Vec::new();
    let mut stats = AggregationStats::default();

    for record in records {
        stats.records_scanned += 1;

        let emitted = category_label(record, request).and_then(|label| {
            let contribution = contribution(record, request, catalog)?;
            let emissions = axis_emissions(record, &request.axis, scaling, contribution);
            (!emissions.is_empty()).then_some((label, emissions))
        });

        let Some((label, emissions)) = emitted else {
            stats.records_skipped += 1;
            continue;
        };

        if !categories.contains(&label) {
            categories.push(label.clone());
        }
        for (axis, contribution, quantity) in emissions {
            groups
                .entry(axis)
                .or_default()
                .entry(label.clone())
                .or_default()
                .add(contribution, quantity);
            stats.emissions += 1;
        }
    }

    let mut rows = BTreeMap::new();
    for (axis, cells) in groups {
        let mut row = BTreeMap::new();
        for (label, acc) in cells {
            let value = match reduction {
                ReductionMode::Sum => acc.sum,
                ReductionMode::WeightedAverage if acc.quantity != 0.0 => {
                    acc.weighted / acc.quantity
                }
                ReductionMode::WeightedAverage => match policy {
                    ZeroWeightPolicy::Error => {
                        return Err(EngineError::ZeroWeight {
                            axis: axis.to_string(),
                            category: label,
                        })
                    }
                    ZeroWeightPolicy::Zero => {
                        warn!(axis = %axis, category = %label, "total quantity is zero, reporting 0");
                        0.0
                    }
                },
            };
            let rounded = round_cell(&label, value);
            row.insert(label, rounded);
        }
        rows.insert(axis, row);
    }

    stats.duration = start.elapsed();
    debug!(
        records = stats.records_scanned,
        skipped = stats.records_skipped,
        emissions = stats.emissions,
        rows = rows.len(),
        "aggregation complete"
    );

    Ok(AggregateTable::new(rows, categories, stats))
}

/// Renders a record field as an axis or category label.
fn field_label(record: &Record, field: &str) -> Option<String> {
    match field {
        well_known::DATE_FROM => record.date_from().map(|d| d.to_string()),
        well_known::DATE_TO => record.date_to().map(|d| d.to_string()),
        _ => record.value(field).map(FieldValue::label),
    }
}

fn category_label(record: &Record, request: &AggregationRequest) -> Option<String> {
    match &request.category {
        CategorySelector::Total => Some(RECORD_COUNT_LABEL.to_string()),
        CategorySelector::None => Some(match &request.value {
            ValueSelector::Total => RECORD_COUNT_LABEL.to_string(),
            ValueSelector::Field(field) => field.clone(),
        }),
        CategorySelector::Field(field) => field_label(record, field),
    }
}

/// Text counts as one record, except in numeric fields where it must parse.
fn contribution(
    record: &Record,
    request: &AggregationRequest,
    catalog: &VariableCatalog,
) -> Option<f64> {
    let field = match &request.value {
        ValueSelector::Total => return Some(1.0),
        ValueSelector::Field(field) => field,
    };

    match record.value(field)? {
        FieldValue::Number(n) => Some(*n),
        text if catalog.kind(field) == FieldKind::Number => text.as_number(),
        FieldValue::Text(_) => Some(1.0),
    }
}

fn axis_emissions(
    record: &Record,
    axis: &Axis,
    scaling: AxisScaling,
    contribution: f64,
) -> Vec<(AxisKey, f64, f64)> {
    let total_days = record.total_days() as f64;
    let base = record
        .quantity()
        .filter(|q| *q != 0.0)
        .unwrap_or(total_days);

    match axis {
        Axis::Year => record
            .total_days_per_year()
            .iter()
            .map(|(&year, &days)| {
                let share = days as f64 / total_days;
                let scaled = match scaling {
                    AxisScaling::ProportionalByDays => contribution * share,
                    AxisScaling::None => contribution,
                };
                (AxisKey::Year(year), scaled, base * share)
            })
            .collect(),
        Axis::Total => vec![(AxisKey::Value(TOTAL.to_string()), contribution, base)],
        Axis::Field(field) => field_label(record, field)
            .map(|label| vec![(AxisKey::Value(label), contribution, base)])
            .unwrap_or_default(),
    }
}
