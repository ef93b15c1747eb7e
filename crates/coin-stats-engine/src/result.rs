//! Aggregate tables and execution statistics.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use coin_stats::VariableCatalog;
use serde::Serialize;

/// Row key of an aggregate table.
///
/// Years sort numerically and before field values, which sort lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum AxisKey {
    /// A calendar year.
    Year(i32),
    /// A field value, or `total` for the single-row axis.
    Value(String),
}

impl fmt::Display for AxisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisKey::Year(year) => write!(f, "{year}"),
            AxisKey::Value(value) => f.write_str(value),
        }
    }
}

/// Output of one aggregation: `axis value -> category label -> number`.
///
/// Cells are reduced and rounded; the table is never mutated afterwards.
///
/// # Example
///
/// ```ignore
/// let table = engine.aggregate(&dataset, &request)?;
///
/// for (axis, cells) in table.rows() {
///     for label in table.categories() {
///         println!("{axis} {label}: {:?}", cells.get(label));
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateTable {
    rows: BTreeMap<AxisKey, BTreeMap<String, f64>>,
    categories: Vec<String>,
    /// Execution statistics.
    #[serde(skip)]
    pub stats: AggregationStats,
}

impl AggregateTable {
    /// Creates a table.
    pub fn new(
        rows: BTreeMap<AxisKey, BTreeMap<String, f64>>,
        categories: Vec<String>,
        stats: AggregationStats,
    ) -> Self {
        Self {
            rows,
            categories,
            stats,
        }
    }

    /// Creates an empty table.
    pub fn empty() -> Self {
        Self::new(BTreeMap::new(), Vec::new(), AggregationStats::default())
    }

    /// Rows in axis order.
    pub fn rows(&self) -> &BTreeMap<AxisKey, BTreeMap<String, f64>> {
        &self.rows
    }

    /// The value of one cell.
    pub fn get(&self, axis: &AxisKey, category: &str) -> Option<f64> {
        self.rows.get(axis)?.get(category).copied()
    }

    /// Category labels in the order they were first encountered.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Display names for the category labels that are catalog fields.
    pub fn display_names(&self, catalog: &VariableCatalog) -> BTreeMap<String, String> {
        self.categories
            .iter()
            .filter(|label| catalog.contains(label))
            .map(|label| (label.clone(), catalog.title(label).to_string()))
            .collect()
    }

    /// Years on the axis, ascending. Empty unless the axis is the year axis.
    pub fn years(&self) -> Vec<i32> {
        self.rows
            .keys()
            .filter_map(|key| match key {
                AxisKey::Year(year) => Some(*year),
                AxisKey::Value(_) => None,
            })
            .collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Statistics from one aggregation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationStats {
    /// Records looked at.
    pub records_scanned: usize,
    /// Records that contributed nothing.
    pub records_skipped: usize,
    /// `(axis, category, contribution, quantity)` tuples accumulated.
    pub emissions: usize,
    /// Time spent computing (or fetching from the cache).
    pub duration: Duration,
    /// Whether the table was served from the cache.
    pub cache_hit: bool,
}
