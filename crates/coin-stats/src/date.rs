//! Calendar dates and day spans.
//!
//! Dates arrive from the web layer as `{year, month, day}` objects and from the
//! catalog as `YYYY/MM/DD` strings. Both are validated once, here, so the engines can
//! assume well-formed spans.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{DataError, DataResult};

/// A validated calendar date.
///
/// Serialises as `{"year": .., "month": .., "day": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDate", into = "RawDate")]
pub struct Date(NaiveDate);

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawDate {
    year: i32,
    month: u32,
    day: u32,
}

impl TryFrom<RawDate> for Date {
    type Error = DataError;

    fn try_from(raw: RawDate) -> DataResult<Self> {
        Date::new(raw.year, raw.month, raw.day)
    }
}

impl From<Date> for RawDate {
    fn from(date: Date) -> Self {
        RawDate {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl Date {
    /// Creates a date, rejecting triples that are not on the calendar.
    pub fn new(year: i32, month: u32, day: u32) -> DataResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or(DataError::InvalidDate { year, month, day })
    }

    /// Wraps an existing chrono date.
    pub fn from_naive_date(date: NaiveDate) -> Self {
        Date(date)
    }

    /// Returns the chrono representation.
    pub fn to_naive_date(self) -> NaiveDate {
        self.0
    }

    /// Calendar year.
    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Month, 1-based.
    pub fn month(self) -> u32 {
        self.0.month()
    }

    /// Day of month, 1-based.
    pub fn day(self) -> u32 {
        self.0.day()
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn check_order(from: Date, to: Date) -> DataResult<()> {
    if to < from {
        return Err(DataError::InvertedSpan {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    Ok(())
}

/// Number of days from `from` to `to`, both inclusive.
pub fn span_days(from: Date, to: Date) -> DataResult<i64> {
    check_order(from, to)?;
    Ok(to.0.signed_duration_since(from.0).num_days() + 1)
}

/// Splits the inclusive span `from..=to` into days per calendar year.
///
/// The first and last year are partial; every year in between counts in full.
/// The values always sum to [`span_days`].
pub fn days_per_year(from: Date, to: Date) -> DataResult<BTreeMap<i32, i64>> {
    check_order(from, to)?;

    let mut per_year = BTreeMap::new();
    for year in from.year()..=to.year() {
        let start = if year == from.year() {
            from.0
        } else {
            year_boundary(year, 1, 1)?
        };
        let end = if year == to.year() {
            to.0
        } else {
            year_boundary(year, 12, 31)?
        };
        per_year.insert(year, end.signed_duration_since(start).num_days() + 1);
    }
    Ok(per_year)
}

fn year_boundary(year: i32, month: u32, day: u32) -> DataResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(DataError::InvalidDate { year, month, day })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> Date {
        Date::new(year, month, day).unwrap()
    }

    #[test]
    fn test_date_new_rejects_invalid() {
        assert!(Date::new(1401, 2, 29).is_err());
        assert!(Date::new(1404, 2, 29).is_ok());
        assert!(Date::new(1400, 2, 29).is_err());
        assert!(Date::new(1500, 13, 1).is_err());
    }

    #[test]
    fn test_date_accessors() {
        let d = date(1452, 7, 14);
        assert_eq!(d.year(), 1452);
        assert_eq!(d.month(), 7);
        assert_eq!(d.day(), 14);
        assert_eq!(d.to_string(), "1452-07-14");
    }

    #[test]
    fn test_date_serde_roundtrip_shape() {
        let d: Date = serde_json::from_str(r#"{"year":1500,"month":3,"day":2}"#).unwrap();
        assert_eq!(d, date(1500, 3, 2));
        let json = serde_json::to_value(d).unwrap();
        assert_eq!(json["year"], 1500);
        assert_eq!(json["month"], 3);
        assert_eq!(json["day"], 2);
    }

    #[test]
    fn test_date_serde_rejects_invalid() {
        let result: Result<Date, _> = serde_json::from_str(r#"{"year":1500,"month":2,"day":31}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_span_days_single_day() {
        assert_eq!(span_days(date(1500, 1, 1), date(1500, 1, 1)).unwrap(), 1);
    }

    #[test]
    fn test_span_days_inverted() {
        let err = span_days(date(1500, 1, 2), date(1500, 1, 1)).unwrap_err();
        assert!(matches!(err, DataError::InvertedSpan { .. }));
    }

    #[test]
    fn test_days_per_year_within_one_year() {
        let per_year = days_per_year(date(1500, 3, 1), date(1500, 3, 31)).unwrap();
        assert_eq!(per_year.len(), 1);
        assert_eq!(per_year[&1500], 31);
    }

    #[test]
    fn test_days_per_year_across_years() {
        let from = date(1399, 12, 31);
        let to = date(1401, 1, 2);
        let per_year = days_per_year(from, to).unwrap();

        assert_eq!(per_year[&1399], 1);
        assert_eq!(per_year[&1400], 365);
        assert_eq!(per_year[&1401], 2);
        assert_eq!(per_year.values().sum::<i64>(), span_days(from, to).unwrap());
    }
}
