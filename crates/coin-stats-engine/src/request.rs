//! Aggregation requests.

use std::fmt;

/// Literal naming the per-year axis.
pub const YEAR: &str = "year";
/// Literal naming record counts (value) or a single series/row (category, axis).
pub const TOTAL: &str = "total";

/// What groups the rows of an aggregate table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Calendar years; each record is split over the years of its span.
    Year,
    /// A single row holding every record.
    Total,
    /// The value of a record field.
    Field(String),
}

/// What each record contributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueSelector {
    /// One per record.
    Total,
    /// The value of a record field.
    Field(String),
}

/// What splits each row into series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CategorySelector {
    /// One series, named after the value.
    None,
    /// One series named "Number of records".
    Total,
    /// One series per value of a record field.
    Field(String),
}

/// An immutable aggregation query.
///
/// # Example
///
/// ```rust
/// use coin_stats_engine::{AggregationRequest, Axis, CategorySelector, ValueSelector};
///
/// let request = AggregationRequest::from_parts("year", "QTTYcoins", "MINT");
/// assert_eq!(request.axis, Axis::Year);
/// assert_eq!(request.value, ValueSelector::Field("QTTYcoins".to_string()));
/// assert_eq!(request.category, CategorySelector::Field("MINT".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AggregationRequest {
    /// Row grouping.
    pub axis: Axis,
    /// Per-record contribution.
    pub value: ValueSelector,
    /// Series split.
    pub category: CategorySelector,
}

impl AggregationRequest {
    /// Creates a request.
    pub fn new(axis: Axis, value: ValueSelector, category: CategorySelector) -> Self {
        Self {
            axis,
            value,
            category,
        }
    }

    /// Builds a request from the web layer's select values.
    ///
    /// `"year"` and `"total"` name the special axes, `"total"` (or nothing) counts
    /// records, and an empty category means a single series.
    pub fn from_parts(axis: &str, value: &str, category: &str) -> Self {
        let axis = match axis.trim() {
            YEAR => Axis::Year,
            TOTAL => Axis::Total,
            field => Axis::Field(field.to_string()),
        };
        let value = match value.trim() {
            TOTAL | "" => ValueSelector::Total,
            field => ValueSelector::Field(field.to_string()),
        };
        let category = match category.trim() {
            "" => CategorySelector::None,
            TOTAL => CategorySelector::Total,
            field => CategorySelector::Field(field.to_string()),
        };
        Self::new(axis, value, category)
    }

    /// Field whose descriptor drives reduction and scaling, if any.
    pub fn value_field(&self) -> Option<&str> {
        match &self.value {
            ValueSelector::Total => None,
            ValueSelector::Field(field) => Some(field),
        }
    }

    /// The parts identifying this request in a memo key.
    pub fn key_parts(&self) -> [String; 3] {
        [
            self.axis.to_string(),
            self.value.to_string(),
            self.category.to_string(),
        ]
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Year => f.write_str(YEAR),
            Axis::Total => f.write_str(TOTAL),
            Axis::Field(field) => f.write_str(field),
        }
    }
}

impl fmt::Display for ValueSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSelector::Total => f.write_str(TOTAL),
            ValueSelector::Field(field) => f.write_str(field),
        }
    }
}

impl fmt::Display for CategorySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategorySelector::None => Ok(()),
            CategorySelector::Total => f.write_str(TOTAL),
            CategorySelector::Field(field) => f.write_str(field),
        }
    }
}

impl fmt::Display for AggregationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.value, self.axis)?;
        match self.category {
            CategorySelector::None => Ok(()),
            ref category => write!(f, " per {category}"),
        }
    }
}
