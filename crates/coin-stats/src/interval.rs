//! Span algebra over day ranges and year sets.
//!
//! Coverage is computed by subtracting attested spans from claimed spans. The same
//! operations exist at two granularities: continuous day ranges ([`DateRange`]) and
//! sets of calendar years ([`YearSet`]).

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

use crate::date::Date;
use crate::error::{DataError, DataResult};

/// Set-like operations shared by [`DateRange`] and [`YearSet`].
///
/// For any `a` and `b`:
/// `sum(length(subtract(a, b))) + length(intersection(a, b)) == length(a)`.
pub trait SpanAlgebra: Sized {
    /// Whether the two spans share at least one day or year.
    fn overlaps(&self, other: &Self) -> bool;

    /// Removes the part of `self` covered by `other`.
    fn subtract(&self, other: &Self) -> Vec<Self>;

    /// The part of `self` also covered by `other`, if any.
    fn intersection(&self, other: &Self) -> Option<Self>;

    /// Size of the span: days for ranges, cardinality for year sets.
    fn length(&self) -> i64;

    /// Whether the span covers nothing.
    fn is_empty(&self) -> bool {
        self.length() == 0
    }
}

/// Sums the lengths of a list of spans.
pub fn total_length<S: SpanAlgebra>(spans: &[S]) -> i64 {
    spans.iter().map(SpanAlgebra::length).sum()
}

/// A half-open day range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a half-open range. `start == end` is the empty range.
    pub fn new(start: NaiveDate, end: NaiveDate) -> DataResult<Self> {
        if end < start {
            return Err(DataError::InvertedSpan {
                from: start.to_string(),
                to: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// The range covering `from..=to`, i.e. `[from, to + 1 day)`.
    pub fn from_dates(from: Date, to: Date) -> DataResult<Self> {
        let to = to.to_naive_date();
        let end = to.succ_opt().ok_or_else(|| DataError::InvalidField {
            field: "DATEto".to_string(),
            message: format!("no day follows {to}"),
        })?;
        Self::new(from.to_naive_date(), end)
    }

    /// First day of the range.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// First day after the range.
    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

impl SpanAlgebra for DateRange {
    fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    fn subtract(&self, other: &Self) -> Vec<Self> {
        if !self.overlaps(other) {
            return vec![*self];
        }

        let mut rest = Vec::with_capacity(2);
        if other.start > self.start {
            rest.push(DateRange {
                start: self.start,
                end: other.start,
            });
        }
        if other.end < self.end {
            rest.push(DateRange {
                start: other.end,
                end: self.end,
            });
        }
        rest
    }

    fn intersection(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(DateRange { start, end })
    }

    fn length(&self) -> i64 {
        self.end.signed_duration_since(self.start).num_days()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// A set of calendar years.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct YearSet(BTreeSet<i32>);

impl YearSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every year from `from` to `to`, both inclusive. Empty when `to < from`.
    pub fn from_span(from: i32, to: i32) -> Self {
        Self((from..=to).collect())
    }

    /// Whether `year` is in the set.
    pub fn contains(&self, year: i32) -> bool {
        self.0.contains(&year)
    }

    /// Number of years.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Adds every year of `other`.
    pub fn extend_with(&mut self, other: &YearSet) {
        self.0.extend(other.0.iter().copied());
    }

    /// Removes every year of `other`.
    pub fn remove_all(&mut self, other: &YearSet) {
        for year in &other.0 {
            self.0.remove(year);
        }
    }

    /// Iterates over the years in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.iter().copied()
    }

    /// Smallest and largest year.
    pub fn bounds(&self) -> Option<(i32, i32)> {
        Some((*self.0.first()?, *self.0.last()?))
    }
}

impl FromIterator<i32> for YearSet {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl SpanAlgebra for YearSet {
    fn overlaps(&self, other: &Self) -> bool {
        !self.0.is_disjoint(&other.0)
    }

    fn subtract(&self, other: &Self) -> Vec<Self> {
        let rest: BTreeSet<i32> = self.0.difference(&other.0).copied().collect();
        if rest.is_empty() {
            Vec::new()
        } else {
            vec![YearSet(rest)]
        }
    }

    fn intersection(&self, other: &Self) -> Option<Self> {
        let common: BTreeSet<i32> = self.0.intersection(&other.0).copied().collect();
        (!common.is_empty()).then_some(YearSet(common))
    }

    fn length(&self) -> i64 {
        self.0.len() as i64
    }
}
