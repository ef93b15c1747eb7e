//! Dataset statistics: missing values, distinct values and the covered years.

use std::collections::{BTreeMap, BTreeSet};

use coin_stats::{FieldKind, FieldValue, Record, VariableCatalog};

/// Count of records lacking a value, per catalog field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDataReport {
    /// Records inspected.
    pub total_records: usize,
    missing: Vec<(String, usize)>,
}

impl MissingDataReport {
    /// Records without a value for `field`, if it is a catalog field.
    pub fn missing(&self, field: &str) -> Option<usize> {
        self.missing
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, count)| *count)
    }

    /// All fields in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.missing.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Fields with at least one missing value, in catalog order.
    pub fn nonzero(&self) -> impl Iterator<Item = (&str, usize)> {
        self.iter().filter(|(_, count)| *count > 0)
    }
}

/// Counts, per catalog field, the records without a value.
///
/// Numeric zero counts as a value. `DATE` is missing when the record has no start date.
pub fn missing_data(records: &[Record], catalog: &VariableCatalog) -> MissingDataReport {
    let missing = catalog
        .fields()
        .map(|field| {
            let count = records.iter().filter(|r| !r.has_value(field)).count();
            (field.to_string(), count)
        })
        .collect();

    MissingDataReport {
        total_records: records.len(),
        missing,
    }
}

/// Distinct raw values of every text field in the catalog.
///
/// Multi-valued entries are kept as written; numbers stored in text fields are
/// rendered as text.
pub fn distinct_values(
    records: &[Record],
    catalog: &VariableCatalog,
) -> BTreeMap<String, BTreeSet<String>> {
    catalog
        .fields()
        .filter(|field| catalog.kind(field) == FieldKind::Text)
        .map(|field| {
            let values = records
                .iter()
                .filter_map(|r| r.value(field))
                .map(FieldValue::label)
                .collect();
            (field.to_string(), values)
        })
        .collect()
}

/// Earliest start year and latest end year over the records with dates.
pub fn year_bounds(records: &[Record]) -> Option<(i32, i32)> {
    let min = records.iter().filter_map(|r| r.date_from()).map(|d| d.year()).min()?;
    let max = records.iter().filter_map(|r| r.date_to()).map(|d| d.year()).max()?;
    Some((min, max))
}
