//! Property tests for aggregation totals, tick plans and coverage bounds.

use std::collections::{BTreeMap, BTreeSet};

use coin_stats::{Date, Record, VariableCatalog};
use coin_stats_engine::{
    aggregate, coverage, ticks, AggregateTable, AggregationRequest, AxisKey, CatalogFeature,
    CoverageCatalog, CoverageQuery, Granularity, Side,
};
use proptest::prelude::*;

const MINTS: [&str; 4] = ["Dordrecht", "Haarlem", "Deventer", "Kampen"];

fn date_strategy() -> impl Strategy<Value = Date> {
    (1380i32..1460, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| Date::new(y, m, d).unwrap())
}

fn span_strategy() -> impl Strategy<Value = (Date, Date)> {
    (date_strategy(), date_strategy()).prop_map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
}

fn record_strategy() -> impl Strategy<Value = Record> {
    (0usize..MINTS.len(), 1u32..500, span_strategy()).prop_map(|(mint, quantity, (from, to))| {
        Record::builder()
            .text("AUTHORITY", "Holland")
            .text("MINT", MINTS[mint])
            .number("QTTYcoins", f64::from(quantity))
            .dates(from, to)
            .build()
            .unwrap()
    })
}

/// Records carrying a raw weight in half grams next to their quantity.
fn weighed_record_strategy() -> impl Strategy<Value = Record> {
    (record_strategy(), 1u32..10_000).prop_map(|(record, half_grams)| {
        let (from, to) = record.span().unwrap();
        Record::builder()
            .text("AUTHORITY", "Holland")
            .text("MINT", record.get("MINT").unwrap().label())
            .number("QTTYcoins", record.quantity().unwrap())
            .number("WEIGHTraw", f64::from(half_grams) / 2.0)
            .dates(from, to)
            .build()
            .unwrap()
    })
}

/// Spans touching at most two calendar years.
fn short_span_strategy() -> impl Strategy<Value = (Date, Date)> {
    (date_strategy(), 0i32..=1, 1u32..=12, 1u32..=28).prop_map(|(from, extra, m, d)| {
        let to = Date::new(from.year() + extra, m, d).unwrap();
        if from <= to { (from, to) } else { (to, from) }
    })
}

fn cells(table: &AggregateTable) -> BTreeMap<(AxisKey, String), f64> {
    table
        .rows()
        .iter()
        .flat_map(|(key, row)| {
            row.iter()
                .map(move |(label, value)| ((key.clone(), label.clone()), *value))
        })
        .collect()
}

fn catalog_strategy() -> impl Strategy<Value = CoverageCatalog> {
    prop::collection::vec((0usize..MINTS.len(), span_strategy()), 1..6).prop_map(|claims| {
        let features = claims.into_iter().map(|(mint, (from, to))| {
            CatalogFeature::new()
                .with("AUTHORITY", "Holland")
                .with("MINT", MINTS[mint])
                .with(
                    "DATEfrom",
                    format!("{}/{}/{}", from.year(), from.month(), from.day()),
                )
                .with("DATEto", format!("{}/{}/{}", to.year(), to.month(), to.day()))
        });
        CoverageCatalog::build(features, "AUTHORITY", "MINT").unwrap()
    })
}

proptest! {
    #[test]
    fn record_counts_add_up(records in prop::collection::vec(record_strategy(), 0..30)) {
        let request = AggregationRequest::from_parts("MINT", "total", "");
        let table = aggregate(&records, &request, &VariableCatalog::coins()).unwrap();

        let counted: f64 = table.rows().values().flat_map(|cells| cells.values()).sum();
        prop_assert_eq!(counted, records.len() as f64);
    }

    #[test]
    fn year_split_conserves_quantity(record in record_strategy()) {
        let request = AggregationRequest::from_parts("year", "QTTYcoins", "");
        let table = aggregate(std::slice::from_ref(&record), &request, &VariableCatalog::coins())
            .unwrap();

        let quantity = record.quantity().unwrap();
        let split: f64 = table.rows().values().flat_map(|cells| cells.values()).sum();
        let slack = 0.5 * table.len() as f64;
        prop_assert!((split - quantity).abs() <= slack);
        prop_assert_eq!(table.len(), record.total_days_per_year().len());
    }

    #[test]
    fn year_split_conserves_weight_within_a_gram_thousandth(
        (from, to) in short_span_strategy(),
        half_grams in 1u32..10_000,
    ) {
        let weight = f64::from(half_grams) / 2.0;
        let record = Record::builder()
            .text("MINT", "Dordrecht")
            .number("WEIGHTraw", weight)
            .dates(from, to)
            .build()
            .unwrap();
        let request = AggregationRequest::from_parts("year", "WEIGHTraw", "");
        let table = aggregate(std::slice::from_ref(&record), &request, &VariableCatalog::coins())
            .unwrap();

        let total_days = record.total_days() as f64;
        for (&year, &days) in record.total_days_per_year() {
            let exact = weight * days as f64 / total_days;
            let cell = table.get(&AxisKey::Year(year), "WEIGHTraw").unwrap();
            prop_assert!((cell - exact).abs() <= 0.0005 + 1e-9);
        }
        let split: f64 = table.rows().values().flat_map(|cells| cells.values()).sum();
        prop_assert!((split - weight).abs() <= 0.001 + 1e-9);
    }

    #[test]
    fn disjoint_record_sets_add_up(
        left in prop::collection::vec(weighed_record_strategy(), 0..12),
        right in prop::collection::vec(weighed_record_strategy(), 0..12),
        by_year in any::<bool>(),
        per_mint in any::<bool>(),
    ) {
        let axis = if by_year { "year" } else { "AUTHORITY" };
        let category = if per_mint { "MINT" } else { "" };
        let union: Vec<Record> = left.iter().chain(&right).cloned().collect();
        let catalog = VariableCatalog::coins();

        for value in ["total", "WEIGHTraw"] {
            let request = AggregationRequest::from_parts(axis, value, category);
            let separate = [&left, &right].map(|records| {
                cells(&aggregate(records, &request, &catalog).unwrap())
            });
            let combined = cells(&aggregate(&union, &request, &catalog).unwrap());

            let keys: BTreeSet<_> = separate.iter().flat_map(|c| c.keys()).collect();
            prop_assert_eq!(keys.len(), combined.len());
            // Each side is rounded to thousandths before the comparison.
            let tolerance = if value == "total" { 0.0 } else { 0.0015 + 1e-9 };
            for key in keys {
                let sum: f64 = separate.iter().filter_map(|c| c.get(key)).sum();
                let joint = combined.get(key).copied().unwrap_or(f64::NAN);
                prop_assert!((joint - sum).abs() <= tolerance, "{:?}: {} vs {}", key, joint, sum);
            }
        }
    }

    #[test]
    fn ticks_step_evenly_past_the_last_year(years in prop::collection::vec(1000i32..2000, 1..50)) {
        let t = ticks(years.iter().copied());
        let max = *years.iter().max().unwrap();

        prop_assert!(t.len() >= 2);
        prop_assert!(*t.last().unwrap() > max);
        prop_assert!(t[t.len() - 2] <= max);
        let step = t[1] - t[0];
        prop_assert!(step > 0);
        prop_assert!(t.windows(2).all(|w| w[1] - w[0] == step));
    }

    #[test]
    fn coverage_is_bounded_and_sorted(
        catalog in catalog_strategy(),
        records in prop::collection::vec(record_strategy(), 0..10),
        by_days in any::<bool>(),
    ) {
        let granularity = if by_days { Granularity::Days } else { Granularity::Years };
        let query = CoverageQuery::new(Side::Primary, "Holland").with_granularity(granularity);
        let result = coverage(&catalog, &records, &query).unwrap();

        prop_assert!((0.0..=100.0).contains(&result.percentage));
        prop_assert!(result.parts.iter().all(|p| (0.0..=100.0).contains(&p.percentage)));
        let sorted = result.parts.windows(2).all(|w| {
            w[0].percentage > w[1].percentage
                || (w[0].percentage == w[1].percentage && w[0].counterpart < w[1].counterpart)
        });
        prop_assert!(sorted);
    }

    #[test]
    fn attesting_a_whole_claim_gives_full_coverage((from, to) in span_strategy(), mint in 0usize..MINTS.len()) {
        let feature = CatalogFeature::new()
            .with("AUTHORITY", "Holland")
            .with("MINT", MINTS[mint])
            .with("DATEfrom", format!("{}/{}/{}", from.year(), from.month(), from.day()))
            .with("DATEto", format!("{}/{}/{}", to.year(), to.month(), to.day()));
        let catalog = CoverageCatalog::build(vec![feature], "AUTHORITY", "MINT").unwrap();
        let record = Record::builder()
            .text("AUTHORITY", "Holland")
            .text("MINT", MINTS[mint])
            .number("QTTYcoins", 1.0)
            .dates(from, to)
            .build()
            .unwrap();

        for granularity in [Granularity::Years, Granularity::Days] {
            let query = CoverageQuery::new(Side::Secondary, MINTS[mint]).with_granularity(granularity);
            let result = coverage(&catalog, std::slice::from_ref(&record), &query).unwrap();
            prop_assert_eq!(result.percentage, 100.0);
        }
    }
}
