//! The coverage catalog: claimed activity spans between two categorical dimensions.

use std::collections::{BTreeMap, BTreeSet};

use coin_stats::record::well_known;
use coin_stats::{parse_catalog_date, parse_values, DataError, DateRange, FieldValue, YearSet};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::EngineResult;

/// Property holding the first year a feature is shown on the time slider.
pub const YEAR_FROM: &str = "YEARfrom";
/// Property holding the last year a feature is shown on the time slider.
pub const YEAR_TO: &str = "YEARto";

/// A catalog entity: the property bag of one geographic feature.
///
/// Deserialises from a GeoJSON `Feature`; geometry is ignored and only string and
/// number properties are kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawFeature")]
pub struct CatalogFeature {
    properties: BTreeMap<String, FieldValue>,
}

#[derive(Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: Option<BTreeMap<String, Value>>,
}

fn scalar(value: Value) -> Option<FieldValue> {
    match value {
        Value::String(text) => Some(FieldValue::Text(text)),
        Value::Number(number) => number.as_f64().map(FieldValue::Number),
        _ => None,
    }
}

impl From<RawFeature> for CatalogFeature {
    fn from(raw: RawFeature) -> Self {
        let properties = raw
            .properties
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, value)| scalar(value).map(|v| (key, v)))
            .collect();
        Self { properties }
    }
}

impl CatalogFeature {
    /// Creates a feature with no properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// A present property value.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.properties.get(key).filter(|v| v.is_present())
    }

    /// A present property rendered as text.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).map(FieldValue::label)
    }

    /// All properties.
    pub fn properties(&self) -> &BTreeMap<String, FieldValue> {
        &self.properties
    }

    /// Whether the feature is shown in `year`.
    ///
    /// Features carrying both `YEARfrom` and `YEARto` are active inside that window
    /// only; all others are always active.
    pub fn active_in(&self, year: i32) -> bool {
        let bound = |key| self.get(key).and_then(FieldValue::as_number);
        match (bound(YEAR_FROM), bound(YEAR_TO)) {
            (Some(from), Some(to)) => from <= f64::from(year) && f64::from(year) <= to,
            _ => true,
        }
    }
}

/// Which of the two catalog dimensions a query names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The first dimension (e.g. authority).
    Primary,
    /// The second dimension (e.g. mint).
    Secondary,
}

impl Side {
    /// The opposite dimension.
    pub fn other(self) -> Side {
        match self {
            Side::Primary => Side::Secondary,
            Side::Secondary => Side::Primary,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Side::Primary => "primary",
            Side::Secondary => "secondary",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One claimed activity span between a value and a counterpart.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSpan {
    /// Value of the other dimension.
    pub counterpart: String,
    /// Calendar years touched by the span.
    pub years: YearSet,
    /// The span as a day range.
    pub range: DateRange,
}

/// Claimed spans indexed by value, for both dimensions.
///
/// Spans of the same pair are kept independently; they may overlap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageCatalog {
    primary_field: String,
    secondary_field: String,
    primary: BTreeMap<String, Vec<CatalogSpan>>,
    secondary: BTreeMap<String, Vec<CatalogSpan>>,
    features: Vec<CatalogFeature>,
}

impl CoverageCatalog {
    /// Builds the catalog from features.
    ///
    /// Features missing either field or either date are skipped. Dates must read
    /// `YYYY/MM/DD`; malformed or inverted spans fail the build. Multi-valued fields
    /// yield one span per pair of tokens.
    ///
    /// # Arguments
    ///
    /// * `features` - Catalog entities, typically read from a GeoJSON layer
    /// * `primary_field` - Property naming the first dimension (e.g. `AUTHORITY`)
    /// * `secondary_field` - Property naming the second dimension (e.g. `MINT`)
    ///
    /// # Errors
    ///
    /// * `EngineError::Data(DataError::ParseError)` - If a date is not `YYYY/MM/DD`
    /// * `EngineError::Data(DataError::InvertedSpan)` - If `DATEto` precedes `DATEfrom`
    pub fn build(
        features: impl IntoIterator<Item = CatalogFeature>,
        primary_field: &str,
        secondary_field: &str,
    ) -> EngineResult<Self> {
        let mut catalog = Self {
            primary_field: primary_field.to_string(),
            secondary_field: secondary_field.to_string(),
            ..Self::default()
        };

        let mut skipped = 0usize;
        for feature in features {
            let (Some(primary), Some(secondary), Some(from), Some(to)) = (
                feature.text(primary_field),
                feature.text(secondary_field),
                feature.text(well_known::DATE_FROM),
                feature.text(well_known::DATE_TO),
            ) else {
                skipped += 1;
                continue;
            };

            let from = parse_catalog_date(&from)?;
            let to = parse_catalog_date(&to)?;
            if to < from {
                return Err(DataError::InvertedSpan {
                    from: from.to_string(),
                    to: to.to_string(),
                }
                .into());
            }
            let years = YearSet::from_span(from.year(), to.year());
            let range = DateRange::from_dates(from, to)?;

            let secondary_tokens = parse_values(&secondary);
            for p in parse_values(&primary) {
                for s in &secondary_tokens {
                    catalog.primary.entry(p.value.clone()).or_default().push(CatalogSpan {
                        counterpart: s.value.clone(),
                        years: years.clone(),
                        range,
                    });
                    catalog.secondary.entry(s.value.clone()).or_default().push(CatalogSpan {
                        counterpart: p.value.clone(),
                        years: years.clone(),
                        range,
                    });
                }
            }
            catalog.features.push(feature);
        }

        if skipped > 0 {
            warn!(skipped, "catalog features without both fields and dates were dropped");
        }
        debug!(
            features = catalog.features.len(),
            primary_values = catalog.primary.len(),
            secondary_values = catalog.secondary.len(),
            "coverage catalog built"
        );

        Ok(catalog)
    }

    /// Field name of a dimension.
    pub fn field(&self, side: Side) -> &str {
        match side {
            Side::Primary => &self.primary_field,
            Side::Secondary => &self.secondary_field,
        }
    }

    /// Field name of the opposite dimension.
    pub fn counterpart_field(&self, side: Side) -> &str {
        self.field(side.other())
    }

    /// Claimed spans of one value.
    pub fn spans(&self, side: Side, value: &str) -> Option<&[CatalogSpan]> {
        self.index(side).get(value).map(Vec::as_slice)
    }

    /// Known values of a dimension, sorted.
    pub fn values(&self, side: Side) -> impl Iterator<Item = &str> {
        self.index(side).keys().map(String::as_str)
    }

    /// Features that contributed spans, in input order.
    pub fn features(&self) -> &[CatalogFeature] {
        &self.features
    }

    /// The first feature for each distinct raw value of a dimension.
    pub fn distinct_features(&self, side: Side) -> Vec<&CatalogFeature> {
        let field = self.field(side);
        let mut seen = BTreeSet::new();
        self.features
            .iter()
            .filter(|feature| feature.text(field).is_some_and(|value| seen.insert(value)))
            .collect()
    }

    /// Whether no span was built.
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }

    fn index(&self, side: Side) -> &BTreeMap<String, Vec<CatalogSpan>> {
        match side {
            Side::Primary => &self.primary,
            Side::Secondary => &self.secondary,
        }
    }
}
