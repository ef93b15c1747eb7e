//! Per-field metadata.
//!
//! The variable catalog tells the engines how each dataset field behaves: whether it
//! is a date, text or number, how values reduce within a group, and whether a value is
//! spread across the years of a record's span.

use serde::Deserialize;

use crate::error::{DataError, DataResult};
use crate::record::well_known;

/// What kind of values a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldKind {
    /// A calendar date.
    Date,
    /// Categorical text, possibly multi-valued.
    #[default]
    Text,
    /// A numeric measurement.
    Number,
}

/// How contributions reduce within one aggregate cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReductionMode {
    /// Plain sum of contributions.
    #[default]
    Sum,
    /// Average weighted by coin quantity.
    WeightedAverage,
}

/// How a record's contribution is split over the years of its span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AxisScaling {
    /// Every year receives the full contribution.
    #[default]
    None,
    /// Each year receives the share of days it holds.
    ProportionalByDays,
}

/// Metadata of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VariableDescriptor {
    /// Value kind.
    pub kind: FieldKind,
    /// Reduction within a cell.
    pub reduction: ReductionMode,
    /// Scaling on the year axis.
    pub scaling: AxisScaling,
    /// Whether the field is offered as an axis, category or value.
    pub of_interest: bool,
}

impl VariableDescriptor {
    /// A text field.
    pub const fn text(of_interest: bool) -> Self {
        Self {
            kind: FieldKind::Text,
            reduction: ReductionMode::Sum,
            scaling: AxisScaling::None,
            of_interest,
        }
    }

    /// A date field.
    pub const fn date(of_interest: bool) -> Self {
        Self {
            kind: FieldKind::Date,
            reduction: ReductionMode::Sum,
            scaling: AxisScaling::None,
            of_interest,
        }
    }

    /// A numeric field of interest.
    pub const fn number(reduction: ReductionMode, scaling: AxisScaling) -> Self {
        Self {
            kind: FieldKind::Number,
            reduction,
            scaling,
            of_interest: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct CatalogEntry {
    name: String,
    title: String,
    descriptor: VariableDescriptor,
}

/// Field metadata keyed by field name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableCatalog {
    entries: Vec<CatalogEntry>,
}

impl VariableCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table for the coin dataset.
    pub fn coins() -> Self {
        let text = VariableDescriptor::text;
        let averaged = VariableDescriptor::number(ReductionMode::WeightedAverage, AxisScaling::None);
        let per_day = VariableDescriptor::number(ReductionMode::Sum, AxisScaling::ProportionalByDays);

        Self::new()
            .with_variable(well_known::UID, text(false))
            .with_variable("TYPEID", text(true))
            .with_variable("SOURCE", text(true))
            .with_variable(well_known::MINT, text(true))
            .with_variable(well_known::AUTHORITY, text(true))
            .with_variable(well_known::DATE, VariableDescriptor::date(false))
            .with_variable(well_known::DATE_FROM, VariableDescriptor::date(true))
            .with_variable(well_known::DATE_TO, VariableDescriptor::date(true))
            .with_variable("CoinNAME", text(true))
            .with_variable("ALLOY", text(true))
            .with_variable("VALUEd", averaged)
            .with_variable(well_known::QUANTITY, per_day)
            .with_variable("FINEness", averaged)
            .with_variable("WEIGHTraw", per_day)
            .with_variable("WEIGHTfine", per_day)
            .with_variable("TAILLE", averaged)
            .with_variable("AUTHORITY_SUPRA", text(true))
            .with_variable("ALT_CoinNAME", text(true))
            .with_variable("ALT_TYPEID", text(true))
            .with_variable("VALUE_HourlyWAGE", averaged)
    }

    /// Loads a catalog from a JSON object of field name to flags.
    ///
    /// Both flag spellings are accepted (`date`/`isDate`, `text`/`isText`,
    /// `number`/`isNumber`, `variableOfInterest`/`isVariableOfInterest`), together with
    /// `divideByDays`, `divideByQtty` and an optional `title`. Fields keep the order of
    /// the JSON object.
    ///
    /// # Example
    ///
    /// ```rust
    /// use coin_stats::{ReductionMode, VariableCatalog};
    ///
    /// let catalog = VariableCatalog::from_json(r#"{
    ///     "FINEness": {"isNumber": true, "divideByQtty": true, "isVariableOfInterest": true,
    ///                  "title": "Fineness"}
    /// }"#).unwrap();
    ///
    /// assert_eq!(catalog.reduction("FINEness"), ReductionMode::WeightedAverage);
    /// assert_eq!(catalog.title("FINEness"), "Fineness");
    /// ```
    pub fn from_json(json: &str) -> DataResult<Self> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;

        let mut catalog = Self::new();
        for (name, flags) in object {
            let raw: RawDescriptor = serde_json::from_value(flags)?;
            let title = raw.title.clone();
            let descriptor = raw.into_descriptor(&name)?;
            catalog = catalog.with_variable(name.clone(), descriptor);
            if let Some(title) = title {
                catalog = catalog.with_title(&name, title);
            }
        }
        Ok(catalog)
    }

    /// Adds or replaces a field. The title defaults to the field name.
    pub fn with_variable(mut self, name: impl Into<String>, descriptor: VariableDescriptor) -> Self {
        let name = name.into();
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.descriptor = descriptor,
            None => self.entries.push(CatalogEntry {
                title: name.clone(),
                name,
                descriptor,
            }),
        }
        self
    }

    /// Sets the display title of a known field; unknown fields are ignored.
    pub fn with_title(mut self, name: &str, title: impl Into<String>) -> Self {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            entry.title = title.into();
        }
        self
    }

    /// Looks up a field.
    pub fn get(&self, name: &str) -> Option<&VariableDescriptor> {
        self.entry(name).map(|e| &e.descriptor)
    }

    /// Descriptor of a field; unknown fields get the default (text, sum, unscaled).
    pub fn descriptor(&self, name: &str) -> VariableDescriptor {
        self.get(name).copied().unwrap_or_default()
    }

    /// Value kind of a field.
    pub fn kind(&self, name: &str) -> FieldKind {
        self.descriptor(name).kind
    }

    /// Reduction mode of a field.
    pub fn reduction(&self, name: &str) -> ReductionMode {
        self.descriptor(name).reduction
    }

    /// Year-axis scaling of a field.
    pub fn scaling(&self, name: &str) -> AxisScaling {
        self.descriptor(name).scaling
    }

    /// Display title of a field, or the name itself when it has none.
    pub fn title<'a>(&'a self, name: &'a str) -> &'a str {
        self.entry(name).map_or(name, |e| e.title.as_str())
    }

    /// Whether the catalog declares `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Field names in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fields usable as chart axis or category: text fields of interest.
    pub fn axis_fields(&self) -> Vec<&str> {
        self.select(|d| d.of_interest && d.kind == FieldKind::Text)
    }

    /// Fields usable as aggregated value: numeric fields of interest.
    pub fn value_fields(&self) -> Vec<&str> {
        self.select(|d| d.of_interest && d.kind == FieldKind::Number)
    }

    /// Fields shown as table columns: everything but the `DATE` pseudo-field.
    pub fn table_columns(&self) -> Vec<&str> {
        self.fields().filter(|name| *name != well_known::DATE).collect()
    }

    /// Fields a filter can target: every non-date field.
    pub fn filterable_fields(&self) -> Vec<&str> {
        self.select(|d| d.kind != FieldKind::Date)
    }

    fn select(&self, keep: impl Fn(&VariableDescriptor) -> bool) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| keep(&e.descriptor))
            .map(|e| e.name.as_str())
            .collect()
    }

    fn entry(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDescriptor {
    #[serde(alias = "isDate")]
    date: bool,
    #[serde(alias = "isText")]
    text: bool,
    #[serde(alias = "isNumber")]
    number: bool,
    #[serde(rename = "divideByDays")]
    divide_by_days: bool,
    #[serde(rename = "divideByQtty")]
    divide_by_qtty: bool,
    #[serde(rename = "variableOfInterest", alias = "isVariableOfInterest")]
    variable_of_interest: bool,
    title: Option<String>,
}

impl RawDescriptor {
    fn into_descriptor(self, name: &str) -> DataResult<VariableDescriptor> {
        let kind = match (self.date, self.text, self.number) {
            (true, false, false) => FieldKind::Date,
            (false, false, true) => FieldKind::Number,
            (false, _, false) => FieldKind::Text,
            _ => {
                return Err(DataError::InvalidField {
                    field: name.to_string(),
                    message: "at most one of date, text and number may be set".to_string(),
                })
            }
        };

        Ok(VariableDescriptor {
            kind,
            reduction: if self.divide_by_qtty {
                ReductionMode::WeightedAverage
            } else {
                ReductionMode::Sum
            },
            scaling: if self.divide_by_days {
                AxisScaling::ProportionalByDays
            } else {
                AxisScaling::None
            },
            of_interest: self.variable_of_interest,
        })
    }
}
