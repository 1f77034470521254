use calltrack::aggregator::{group_by_dimensions, group_by_period, rate_of};
use calltrack::labels::normalize_dimension_label;
use calltrack::record::{AGENCY, CHANNEL, CallRecord};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn record_strategy() -> impl Strategy<Value = CallRecord> {
    (
        prop::sample::select(vec!["2024-11", "2024-12", "2025-01", "2025-02"]),
        prop::sample::select(vec!["Nord", "Sud", "Est"]),
        prop::sample::select(vec!["GMB", "Pages Jaunes", "Store Locator", "Autres"]),
        0u64..500,
        0u64..500,
    )
        .prop_map(|(period, agency, channel, a, b)| {
            let (answered, total) = if a <= b { (a, b) } else { (b, a) };
            CallRecord::new(period, answered, total)
                .with(AGENCY, agency)
                .with(CHANNEL, channel)
        })
}

proptest! {
    #[test]
    fn sums_are_conserved(records in prop::collection::vec(record_strategy(), 0..60)) {
        let summaries = group_by_period(&records);
        let answered: u64 = summaries.iter().map(|s| s.answered).sum();
        let total: u64 = summaries.iter().map(|s| s.total).sum();
        prop_assert_eq!(answered, records.iter().map(|r| r.answered).sum::<u64>());
        prop_assert_eq!(total, records.iter().map(|r| r.total).sum::<u64>());

        let compound = group_by_dimensions(&records, &[AGENCY, CHANNEL]);
        prop_assert_eq!(compound.iter().map(|s| s.total).sum::<u64>(), total);
    }

    #[test]
    fn every_period_appears_once_in_order(records in prop::collection::vec(record_strategy(), 0..60)) {
        let keys: Vec<String> = group_by_period(&records).into_iter().map(|s| s.key).collect();
        let mut expected: Vec<String> = records.iter().map(|r| r.period.clone()).collect();
        expected.sort();
        expected.dedup();
        prop_assert_eq!(keys, expected);
    }

    #[test]
    fn grouping_ignores_input_order(
        records in prop::collection::vec(record_strategy(), 0..40),
        seed in any::<u64>(),
    ) {
        let mut shuffled = records.clone();
        // Deterministic rotation plus reversal, enough to change the order
        if !shuffled.is_empty() {
            let len = shuffled.len();
            shuffled.rotate_left((seed as usize) % len);
        }
        shuffled.reverse();

        let as_map = |rs: &[CallRecord]| -> BTreeMap<String, (u64, u64)> {
            group_by_period(rs).into_iter().map(|s| (s.key, (s.answered, s.total))).collect()
        };
        prop_assert_eq!(as_map(&records), as_map(&shuffled));
    }

    #[test]
    fn rate_is_bounded(a in 0u64..10_000, b in 0u64..10_000) {
        let (answered, total) = if a <= b { (a, b) } else { (b, a) };
        match rate_of(answered, total) {
            None => prop_assert_eq!(total, 0),
            Some(rate) => {
                prop_assert!(total > 0);
                prop_assert!((0.0..=100.0).contains(&rate));
            }
        }
    }

    #[test]
    fn normalizer_is_idempotent(
        base in "[A-Za-z][A-Za-z ]{0,20}",
        suffix in prop::sample::select(vec!["", " - GMB", " - pages jaunes", " - PJ", " - Store Locator", " - Autres", " - GMB - PJ"]),
    ) {
        let raw = format!("{}{}", base, suffix);
        let once = normalize_dimension_label(&raw);
        let twice = normalize_dimension_label(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn labels_without_separator_pass_through(raw in "[A-Za-z ]{0,24}") {
        prop_assert_eq!(normalize_dimension_label(&raw), raw);
    }
}
