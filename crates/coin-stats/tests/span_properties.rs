//! Property tests for day counts and span subtraction.

use chrono::{Days, NaiveDate};
use coin_stats::{
    days_per_year, parse_values, span_days, total_length, Date, DateRange, Record, SpanAlgebra,
    YearSet,
};
use proptest::prelude::*;

fn base_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(1350, 1, 1).unwrap()
}

fn day_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..100_000).prop_map(|offset| base_day() + Days::new(offset))
}

fn range_strategy() -> impl Strategy<Value = DateRange> {
    (day_strategy(), 0u64..5_000)
        .prop_map(|(start, len)| DateRange::new(start, start + Days::new(len)).unwrap())
}

fn year_set_strategy() -> impl Strategy<Value = YearSet> {
    prop::collection::btree_set(1300i32..1600, 0..60).prop_map(|years| years.into_iter().collect())
}

fn span_strategy() -> impl Strategy<Value = (Date, Date)> {
    (day_strategy(), 0u64..4_000).prop_map(|(from, len)| {
        (
            Date::from_naive_date(from),
            Date::from_naive_date(from + Days::new(len)),
        )
    })
}

proptest! {
    #[test]
    fn date_range_subtraction_conserves_length(a in range_strategy(), b in range_strategy()) {
        let rest = a.subtract(&b);
        let common = a.intersection(&b).map_or(0, |r| r.length());

        prop_assert!(rest.len() <= 2);
        prop_assert_eq!(total_length(&rest) + common, a.length());
        prop_assert!(rest.iter().all(|r| !r.overlaps(&b)));
    }

    #[test]
    fn year_set_subtraction_conserves_length(a in year_set_strategy(), b in year_set_strategy()) {
        let rest = a.subtract(&b);
        let common = a.intersection(&b).map_or(0, |s| s.length());

        prop_assert!(rest.len() <= 1);
        prop_assert_eq!(total_length(&rest) + common, a.length());
        prop_assert_eq!(common > 0, a.overlaps(&b));
    }

    #[test]
    fn days_per_year_sums_to_span((from, to) in span_strategy()) {
        let per_year = days_per_year(from, to).unwrap();
        let total = span_days(from, to).unwrap();

        prop_assert_eq!(per_year.values().sum::<i64>(), total);
        prop_assert_eq!(per_year.len() as i32, to.year() - from.year() + 1);
        prop_assert!(per_year.values().all(|days| (1..=366).contains(days)));
    }

    #[test]
    fn record_enrichment_matches_range_length((from, to) in span_strategy()) {
        let record = Record::builder().dates(from, to).build().unwrap();
        let range = DateRange::from_dates(from, to).unwrap();

        prop_assert_eq!(record.total_days(), range.length());
        prop_assert_eq!(
            record.total_days_per_year().values().sum::<i64>(),
            record.total_days()
        );
    }

    #[test]
    fn parsed_tokens_are_trimmed(input in "[A-Za-z ?/]{0,40}") {
        for token in parse_values(&input) {
            prop_assert!(!token.value.is_empty());
            prop_assert!(!token.value.contains('/'));
            prop_assert_eq!(token.value.trim(), token.value.as_str());
        }
    }
}
