//! Dataset records.
//!
//! A [`Record`] is one historical find or mint account: a bag of categorical and
//! numeric fields plus an optional `DATEfrom`/`DATEto` span. The span is enriched with
//! its length in days and its per-calendar-year split when the record is built.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::date::{days_per_year, span_days, Date};
use crate::error::{DataError, DataResult};
use crate::parser::parse_values;
use crate::value::{FieldValue, Token};

/// Field names with a fixed meaning in the coin dataset.
pub mod well_known {
    /// Unique record identifier.
    pub const UID: &str = "UID";
    /// Mint location.
    pub const MINT: &str = "MINT";
    /// Issuing authority.
    pub const AUTHORITY: &str = "AUTHORITY";
    /// Number of coins minted; weights averages and marks a record as quantified.
    pub const QUANTITY: &str = "QTTYcoins";
    /// Pseudo-field standing for the whole date span.
    pub const DATE: &str = "DATE";
    /// Start of the record's span.
    pub const DATE_FROM: &str = "DATEfrom";
    /// End of the record's span (inclusive).
    pub const DATE_TO: &str = "DATEto";
}

/// One dataset record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawRecord", into = "RawRecord")]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
    date_from: Option<Date>,
    date_to: Option<Date>,
    total_days: i64,
    total_days_per_year: BTreeMap<i32, i64>,
}

impl Record {
    /// Starts building a record.
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }

    /// Returns the raw value of a field, present or not.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Returns the value of a field when it is present (a number or non-empty text).
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field).filter(|v| v.is_present())
    }

    /// Whether the record has a value for `field`.
    ///
    /// The date fields are answered from the span: `DATE` and `DATEfrom` look at the
    /// start date, `DATEto` at the end date.
    pub fn has_value(&self, field: &str) -> bool {
        match field {
            well_known::DATE | well_known::DATE_FROM => self.date_from.is_some(),
            well_known::DATE_TO => self.date_to.is_some(),
            _ => self.value(field).is_some(),
        }
    }

    /// Number of coins, when the record carries one.
    pub fn quantity(&self) -> Option<f64> {
        self.value(well_known::QUANTITY).and_then(FieldValue::as_number)
    }

    /// Parsed tokens of a (possibly multi-valued) categorical field.
    pub fn values_of(&self, field: &str) -> Vec<Token> {
        match self.value(field) {
            Some(FieldValue::Text(text)) => parse_values(text),
            Some(number @ FieldValue::Number(_)) => vec![Token::new(number.label(), false)],
            None => Vec::new(),
        }
    }

    /// Whether one of the parsed tokens of `field` equals `value`.
    pub fn names(&self, field: &str, value: &str) -> bool {
        self.values_of(field).iter().any(|t| t.value == value)
    }

    /// Start of the span.
    pub fn date_from(&self) -> Option<Date> {
        self.date_from
    }

    /// End of the span (inclusive).
    pub fn date_to(&self) -> Option<Date> {
        self.date_to
    }

    /// Both ends of the span, when the record has one.
    pub fn span(&self) -> Option<(Date, Date)> {
        self.date_from.zip(self.date_to)
    }

    /// Length of the span in days, both ends inclusive (0 without a span).
    pub fn total_days(&self) -> i64 {
        self.total_days
    }

    /// Days of the span falling in each calendar year.
    pub fn total_days_per_year(&self) -> &BTreeMap<i32, i64> {
        &self.total_days_per_year
    }

    /// Iterates over all non-date fields.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn enrich(&mut self) -> DataResult<()> {
        match self.span() {
            Some((from, to)) => {
                self.total_days = span_days(from, to)?;
                self.total_days_per_year = days_per_year(from, to)?;
            }
            None => {
                self.total_days = 0;
                self.total_days_per_year.clear();
            }
        }
        Ok(())
    }
}

/// Builder for [`Record`].
///
/// # Example
///
/// ```rust
/// use coin_stats::{Date, Record};
///
/// let record = Record::builder()
///     .text("MINT", "Dordrecht")
///     .number("QTTYcoins", 1200.0)
///     .dates(Date::new(1400, 1, 1).unwrap(), Date::new(1400, 12, 31).unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!(record.total_days(), 365);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    fields: BTreeMap<String, FieldValue>,
    date_from: Option<Date>,
    date_to: Option<Date>,
}

impl RecordBuilder {
    /// Sets a field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Sets a text field.
    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.field(name, FieldValue::Text(value.into()))
    }

    /// Sets a numeric field.
    pub fn number(self, name: impl Into<String>, value: f64) -> Self {
        self.field(name, FieldValue::Number(value))
    }

    /// Sets the span.
    pub fn dates(mut self, from: Date, to: Date) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    /// Builds the record, computing its day counts.
    ///
    /// Fails when the span ends before it starts.
    pub fn build(self) -> DataResult<Record> {
        let mut record = Record {
            fields: self.fields,
            date_from: self.date_from,
            date_to: self.date_to,
            ..Record::default()
        };
        record.enrich()?;
        Ok(record)
    }
}

/// Wire shape of a record as served by the web layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawRecord {
    #[serde(rename = "DATEfrom", default, skip_serializing_if = "Option::is_none")]
    date_from: Option<Date>,
    #[serde(rename = "DATEto", default, skip_serializing_if = "Option::is_none")]
    date_to: Option<Date>,
    #[serde(rename = "totalDays", default, skip_serializing_if = "Option::is_none")]
    total_days: Option<i64>,
    #[serde(
        rename = "totalDaysPerYear",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    total_days_per_year: Option<BTreeMap<i32, i64>>,
    #[serde(flatten)]
    fields: BTreeMap<String, Option<FieldValue>>,
}

impl TryFrom<RawRecord> for Record {
    type Error = DataError;

    fn try_from(raw: RawRecord) -> DataResult<Self> {
        let fields = raw
            .fields
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect();

        let mut record = Record {
            fields,
            date_from: raw.date_from,
            date_to: raw.date_to,
            ..Record::default()
        };

        record.enrich()?;
        if let Some(total_days) = raw.total_days {
            if total_days != record.total_days {
                return Err(DataError::InvalidField {
                    field: "totalDays".to_string(),
                    message: format!(
                        "{total_days} does not match the {} days of the date span",
                        record.total_days
                    ),
                });
            }
        }
        if let Some(per_year) = raw.total_days_per_year {
            if per_year != record.total_days_per_year {
                return Err(DataError::InvalidField {
                    field: "totalDaysPerYear".to_string(),
                    message: "per-year days do not match the date span".to_string(),
                });
            }
        }

        Ok(record)
    }
}

impl From<Record> for RawRecord {
    fn from(record: Record) -> Self {
        let has_span = record.span().is_some();
        RawRecord {
            date_from: record.date_from,
            date_to: record.date_to,
            total_days: has_span.then_some(record.total_days),
            total_days_per_year: has_span.then_some(record.total_days_per_year),
            fields: record
                .fields
                .into_iter()
                .map(|(name, value)| (name, Some(value)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> Date {
        Date::new(year, month, day).unwrap()
    }

    #[test]
    fn test_builder_enriches_span() {
        let record = Record::builder()
            .text("MINT", "Dordrecht")
            .dates(date(1400, 12, 1), date(1401, 1, 31))
            .build()
            .unwrap();

        assert_eq!(record.total_days(), 62);
        assert_eq!(record.total_days_per_year()[&1400], 31);
        assert_eq!(record.total_days_per_year()[&1401], 31);
    }

    #[test]
    fn test_builder_without_span() {
        let record = Record::builder().text("MINT", "Dordrecht").build().unwrap();
        assert_eq!(record.total_days(), 0);
        assert!(record.total_days_per_year().is_empty());
        assert!(!record.has_value(well_known::DATE));
    }

    #[test]
    fn test_builder_rejects_inverted_span() {
        let result = Record::builder()
            .dates(date(1410, 1, 1), date(1400, 1, 1))
            .build();
        assert!(matches!(result, Err(DataError::InvertedSpan { .. })));
    }

    #[test]
    fn test_value_presence() {
        let record = Record::builder()
            .text("ALLOY", "")
            .text("MINT", "Dordrecht")
            .number("QTTYcoins", 0.0)
            .build()
            .unwrap();

        assert!(record.get("ALLOY").is_some());
        assert!(record.value("ALLOY").is_none());
        assert!(record.has_value("MINT"));
        assert_eq!(record.quantity(), Some(0.0));
    }

    #[test]
    fn test_values_of_multi_valued_field() {
        let record = Record::builder()
            .text("AUTHORITY", "Holland / Zeeland?")
            .build()
            .unwrap();

        assert!(record.names("AUTHORITY", "Holland"));
        assert!(record.names("AUTHORITY", "Zeeland"));
        assert!(!record.names("AUTHORITY", "Zeeland?"));
        assert!(record.values_of("MINT").is_empty());
    }

    #[test]
    fn test_deserialize_web_shape_computes_span() {
        let json = r#"{
            "UID": "r1",
            "MINT": "Dordrecht",
            "QTTYcoins": 10,
            "ALLOY": null,
            "DATEfrom": {"year": 1400, "month": 1, "day": 1},
            "DATEto": {"year": 1401, "month": 12, "day": 31}
        }"#;
        let record: Record = serde_json::from_str(json).unwrap();

        assert_eq!(record.quantity(), Some(10.0));
        assert!(record.get("ALLOY").is_none());
        assert_eq!(record.total_days(), 730);
        assert_eq!(record.total_days_per_year().len(), 2);
    }

    #[test]
    fn test_deserialize_accepts_matching_totals() {
        let json = r#"{
            "MINT": "Kampen",
            "DATEfrom": {"year": 1400, "month": 1, "day": 1},
            "DATEto": {"year": 1400, "month": 1, "day": 10},
            "totalDays": 10,
            "totalDaysPerYear": {"1400": 10}
        }"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.total_days(), 10);
        assert_eq!(record.total_days_per_year()[&1400], 10);
    }

    #[test]
    fn test_deserialize_rejects_inconsistent_split() {
        let json = r#"{
            "DATEfrom": {"year": 1400, "month": 1, "day": 1},
            "DATEto": {"year": 1400, "month": 1, "day": 10},
            "totalDays": 10,
            "totalDaysPerYear": {"1400": 9}
        }"#;
        assert!(serde_json::from_str::<Record>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_totals_disagreeing_with_dates() {
        let zero = r#"{
            "QTTYcoins": 5,
            "DATEfrom": {"year": 1400, "month": 1, "day": 1},
            "DATEto": {"year": 1400, "month": 12, "day": 31},
            "totalDays": 0,
            "totalDaysPerYear": {"1400": 0}
        }"#;
        let err = serde_json::from_str::<Record>(zero).unwrap_err();
        assert!(err.to_string().contains("totalDays"));

        let stretched = r#"{
            "DATEfrom": {"year": 1400, "month": 1, "day": 1},
            "DATEto": {"year": 1400, "month": 1, "day": 10},
            "totalDays": 20,
            "totalDaysPerYear": {"1400": 20}
        }"#;
        assert!(serde_json::from_str::<Record>(stretched).is_err());

        let undated = r#"{"MINT": "Kampen", "totalDays": 30}"#;
        assert!(serde_json::from_str::<Record>(undated).is_err());
    }

    #[test]
    fn test_deserialize_computes_missing_totals() {
        let json = r#"{
            "DATEfrom": {"year": 1400, "month": 12, "day": 22},
            "DATEto": {"year": 1401, "month": 1, "day": 10},
            "totalDays": 20
        }"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.total_days_per_year()[&1400], 10);
        assert_eq!(record.total_days_per_year()[&1401], 10);
    }

    #[test]
    fn test_serialize_web_shape() {
        let record = Record::builder()
            .text("MINT", "Deventer")
            .dates(date(1450, 6, 1), date(1450, 6, 30))
            .build()
            .unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["MINT"], "Deventer");
        assert_eq!(json["totalDays"], 30);
        assert_eq!(json["DATEfrom"]["month"], 6);
    }
}
