//! Coverage of claimed activity spans by the records.
//!
//! For a selected value, every counterpart in the coverage catalog has a set of
//! claimed spans. Each matching record attests its own span for the counterparts it
//! names; whatever the attestations leave behind is unattested. Coverage reports the
//! attested share per counterpart and the mean over counterparts.

mod catalog;

pub use catalog::{CatalogFeature, CatalogSpan, CoverageCatalog, Side, YEAR_FROM, YEAR_TO};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use coin_stats::record::well_known;
use coin_stats::{total_length, DateRange, Record, SpanAlgebra, YearSet};
use serde::Serialize;
use tracing::debug;

use crate::aggregation::round_half_up;
use crate::cache::{cache_key, ResultCache};
use crate::config::EngineConfig;
use crate::dataset::DatasetSnapshot;
use crate::error::{EngineError, EngineResult};

/// What a coverage query reports per counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoverageMode {
    /// Attested percentage of the claimed span.
    Ratio,
    /// 100 if the year is claimed but unattested, 0 if it is attested.
    /// Counterparts not claiming the year are left out.
    SelectedYear(i32),
}

/// Resolution of span arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    /// Calendar years; claimed spans of a counterpart are merged.
    #[default]
    Years,
    /// Days; claimed spans are kept separate and may overlap.
    Days,
}

/// A coverage question about one value of one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoverageQuery {
    /// Dimension the value belongs to.
    pub side: Side,
    /// The selected value.
    pub value: String,
    /// Reported quantity.
    pub mode: CoverageMode,
    /// Span resolution.
    pub granularity: Granularity,
}

impl CoverageQuery {
    /// A ratio query at year granularity.
    pub fn new(side: Side, value: impl Into<String>) -> Self {
        Self {
            side,
            value: value.into(),
            mode: CoverageMode::Ratio,
            granularity: Granularity::Years,
        }
    }

    /// Sets the mode.
    pub fn with_mode(mut self, mode: CoverageMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the granularity.
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    fn key_parts(&self) -> [String; 4] {
        let mode = match self.mode {
            CoverageMode::Ratio => "ratio".to_string(),
            CoverageMode::SelectedYear(year) => format!("year:{year}"),
        };
        let granularity = match self.granularity {
            Granularity::Years => "years",
            Granularity::Days => "days",
        };
        [
            self.side.to_string(),
            self.value.clone(),
            mode,
            granularity.to_string(),
        ]
    }
}

impl fmt::Display for CoverageQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [side, value, mode, granularity] = self.key_parts();
        write!(f, "{side}={value} ({mode}, {granularity})")
    }
}

/// Coverage of one counterpart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoveragePart {
    /// The counterpart value.
    pub counterpart: String,
    /// Percentage in `[0, 100]`.
    pub percentage: f64,
}

/// Outcome of a coverage query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageResult {
    /// Mean of the part percentages; 0 when there are no parts.
    pub percentage: f64,
    /// Parts by descending percentage, ties by counterpart.
    pub parts: Vec<CoveragePart>,
    /// Execution statistics.
    #[serde(skip)]
    pub stats: CoverageStats,
}

impl CoverageResult {
    /// A result with no parts.
    pub fn empty() -> Self {
        Self {
            percentage: 0.0,
            parts: Vec::new(),
            stats: CoverageStats::default(),
        }
    }

    fn from_parts(mut parts: Vec<CoveragePart>, stats: CoverageStats) -> Self {
        parts.sort_by(|a, b| {
            b.percentage
                .total_cmp(&a.percentage)
                .then_with(|| a.counterpart.cmp(&b.counterpart))
        });
        let percentage = if parts.is_empty() {
            0.0
        } else {
            parts.iter().map(|p| p.percentage).sum::<f64>() / parts.len() as f64
        };
        Self {
            percentage,
            parts,
            stats,
        }
    }

    /// The part of one counterpart.
    pub fn part(&self, counterpart: &str) -> Option<&CoveragePart> {
        self.parts.iter().find(|p| p.counterpart == counterpart)
    }
}

/// Statistics from one coverage query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageStats {
    /// Records naming the selected value with a quantity and both dates.
    pub records_matched: usize,
    /// Counterparts claimed by the selected value.
    pub counterparts: usize,
    /// Time spent computing (or fetching from the cache).
    pub duration: Duration,
    /// Whether the result was served from the cache.
    pub cache_hit: bool,
}

/// A span attested by one record for the counterparts it names.
struct Attestation<S> {
    counterparts: Vec<String>,
    span: S,
}

/// Computes coverage of `query.value` by `records`.
///
/// A value unknown to the catalog yields an empty result. Selected-year mode requires
/// year granularity.
///
/// # Errors
///
/// Returns [`EngineError::UnsupportedMode`] for `CoverageMode::SelectedYear` combined with
/// `Granularity::Days`.
pub fn coverage(
    catalog: &CoverageCatalog,
    records: &[Record],
    query: &CoverageQuery,
) -> EngineResult<CoverageResult> {
    let start = Instant::now();
    if let (Granularity::Days, CoverageMode::SelectedYear(year)) = (query.granularity, query.mode)
    {
        return Err(EngineError::UnsupportedMode(format!(
            "selected year {year} requires year granularity"
        )));
    }

    let Some(spans) = catalog.spans(query.side, &query.value) else {
        debug!(query = %query, "value not in coverage catalog");
        return Ok(CoverageResult::empty());
    };

    let field = catalog.field(query.side);
    let other = catalog.counterpart_field(query.side);
    let matching: Vec<&Record> = records
        .iter()
        .filter(|r| r.has_value(well_known::QUANTITY) && r.span().is_some())
        .filter(|r| r.names(field, &query.value))
        .collect();

    let parts = match query.granularity {
        Granularity::Years => {
            let mut merged: BTreeMap<String, YearSet> = BTreeMap::new();
            for span in spans {
                merged
                    .entry(span.counterpart.clone())
                    .or_default()
                    .extend_with(&span.years);
            }
            let claimed: BTreeMap<String, Vec<YearSet>> =
                merged.into_iter().map(|(c, years)| (c, vec![years])).collect();
            let attested: Vec<Attestation<YearSet>> = matching
                .iter()
                .filter_map(|r| {
                    let (from, to) = r.span()?;
                    Some(Attestation {
                        counterparts: counterparts(r, other),
                        span: YearSet::from_span(from.year(), to.year()),
                    })
                })
                .collect();
            let left = subtract_attested(&claimed, &attested);
            match query.mode {
                CoverageMode::Ratio => ratio_parts(&claimed, &left),
                CoverageMode::SelectedYear(year) => selected_year_parts(&claimed, &left, year),
            }
        }
        Granularity::Days => {
            let mut claimed: BTreeMap<String, Vec<DateRange>> = BTreeMap::new();
            for span in spans {
                claimed.entry(span.counterpart.clone()).or_default().push(span.range);
            }
            let mut attested = Vec::with_capacity(matching.len());
            for record in &matching {
                if let Some((from, to)) = record.span() {
                    attested.push(Attestation {
                        counterparts: counterparts(record, other),
                        span: DateRange::from_dates(from, to)?,
                    });
                }
            }
            let left = subtract_attested(&claimed, &attested);
            ratio_parts(&claimed, &left)
        }
    };

    let stats = CoverageStats {
        records_matched: matching.len(),
        counterparts: parts.len(),
        duration: start.elapsed(),
        cache_hit: false,
    };
    let result = CoverageResult::from_parts(parts, stats);
    debug!(
        query = %query,
        matched = result.stats.records_matched,
        counterparts = result.stats.counterparts,
        percentage = result.percentage,
        "coverage computed"
    );
    Ok(result)
}

fn counterparts(record: &Record, field: &str) -> Vec<String> {
    record.values_of(field).into_iter().map(|t| t.value).collect()
}

fn subtract_attested<S: SpanAlgebra + Clone>(
    claimed: &BTreeMap<String, Vec<S>>,
    attested: &[Attestation<S>],
) -> BTreeMap<String, Vec<S>> {
    let mut left = claimed.clone();
    for attestation in attested {
        for counterpart in &attestation.counterparts {
            if let Some(spans) = left.get_mut(counterpart) {
                *spans = spans
                    .iter()
                    .flat_map(|span| span.subtract(&attestation.span))
                    .collect();
            }
        }
    }
    left
}

fn ratio_parts<S: SpanAlgebra>(
    claimed: &BTreeMap<String, Vec<S>>,
    left: &BTreeMap<String, Vec<S>>,
) -> Vec<CoveragePart> {
    claimed
        .iter()
        .filter_map(|(counterpart, spans)| {
            let before = total_length(spans);
            if before == 0 {
                return None;
            }
            let after = left.get(counterpart).map_or(0, |s| total_length(s));
            let unattested = round_half_up(after as f64 / (before as f64 / 100.0));
            Some(CoveragePart {
                counterpart: counterpart.clone(),
                percentage: 100.0 - unattested,
            })
        })
        .collect()
}

fn selected_year_parts(
    claimed: &BTreeMap<String, Vec<YearSet>>,
    left: &BTreeMap<String, Vec<YearSet>>,
    year: i32,
) -> Vec<CoveragePart> {
    claimed
        .iter()
        .filter(|(_, sets)| holds(sets, year))
        .map(|(counterpart, _)| {
            let unattested = left.get(counterpart).is_some_and(|sets| holds(sets, year));
            CoveragePart {
                counterpart: counterpart.clone(),
                percentage: if unattested { 100.0 } else { 0.0 },
            }
        })
        .collect()
}

fn holds(sets: &[YearSet], year: i32) -> bool {
    sets.iter().any(|s| s.contains(year))
}

/// Coverage engine over a fixed catalog, with optional per-snapshot memoisation.
#[derive(Debug)]
pub struct CoverageEngine {
    catalog: Arc<CoverageCatalog>,
    cache: Option<ResultCache<CoverageResult>>,
}

impl CoverageEngine {
    /// Creates an engine without memoisation.
    pub fn new(catalog: Arc<CoverageCatalog>) -> Self {
        Self::with_config(catalog, EngineConfig::default())
    }

    /// Creates an engine memoising per the configuration.
    pub fn with_config(catalog: Arc<CoverageCatalog>, config: EngineConfig) -> Self {
        Self {
            catalog,
            cache: config.cache.map(ResultCache::new),
        }
    }

    /// The coverage catalog.
    pub fn catalog(&self) -> &CoverageCatalog {
        &self.catalog
    }

    /// The memo, if enabled.
    pub fn cache(&self) -> Option<&ResultCache<CoverageResult>> {
        self.cache.as_ref()
    }

    /// Drops every memoised result.
    pub fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate();
        }
    }

    /// Computes coverage over a snapshot, answering from the memo when possible.
    ///
    /// # Arguments
    ///
    /// * `dataset` - The snapshot whose records attest the catalog spans
    /// * `query` - Side, value, mode and granularity of the coverage chart
    ///
    /// # Returns
    ///
    /// * `Ok(CoverageResult)` - Per-counterpart percentages and their mean
    /// * `Err(EngineError::UnsupportedMode)` - If a selected year is asked for by days
    pub fn coverage(
        &self,
        dataset: &dyn DatasetSnapshot,
        query: &CoverageQuery,
    ) -> EngineResult<CoverageResult> {
        let start = Instant::now();
        let parts = query.key_parts();
        let key = cache_key(
            dataset.generation(),
            &[
                "coverage",
                parts[0].as_str(),
                parts[1].as_str(),
                parts[2].as_str(),
                parts[3].as_str(),
            ],
        );

        if let Some(cache) = &self.cache {
            if let Some(mut result) = cache.get(&key) {
                result.stats.cache_hit = true;
                result.stats.duration = start.elapsed();
                debug!(key = %key, "coverage served from cache");
                return Ok(result);
            }
        }

        let result = coverage(&self.catalog, dataset.records(), query)?;
        if let Some(cache) = &self.cache {
            cache.insert(key, result.clone());
        }
        Ok(result)
    }
}
