use calltrack::aggregator::{
    group_by_dimension, group_by_dimension_then_period, group_by_entity, group_by_period, rate_of,
    totals,
};
use calltrack::labels::normalize_dimension_label;
use calltrack::record::{AGENCY, CHANNEL, CallRecord, DimensionFilter, Selection, agency_channel_filter};

fn feed() -> Vec<CallRecord> {
    vec![
        CallRecord::new("2025-01", 40, 50).with(AGENCY, "Agence Nord - GMB").with(CHANNEL, "GMB"),
        CallRecord::new("2025-01", 10, 20)
            .with(AGENCY, "Agence Nord - Pages Jaunes")
            .with(CHANNEL, "Pages Jaunes"),
        CallRecord::new("2025-02", 30, 30).with(AGENCY, "Agence Sud").with(CHANNEL, "GMB"),
        CallRecord::new("2025-02", 0, 0).with(AGENCY, "Agence Sud").with(CHANNEL, "Autres"),
        CallRecord::new("2024-12", 5, 10).with(AGENCY, "Agence Sud").with(CHANNEL, "Store Locator"),
    ]
}

#[test]
fn worked_example_by_period() {
    let records = vec![
        CallRecord::new("2025-01", 3, 10),
        CallRecord::new("2025-01", 7, 10),
        CallRecord::new("2025-02", 0, 0),
    ];

    let summaries = group_by_period(&records);
    assert_eq!(summaries.len(), 2);

    assert_eq!(summaries[0].key, "2025-01");
    assert_eq!(summaries[0].answered, 10);
    assert_eq!(summaries[0].total, 20);
    assert_eq!(summaries[0].rate, Some(50.0));

    assert_eq!(summaries[1].key, "2025-02");
    assert_eq!(summaries[1].answered, 0);
    assert_eq!(summaries[1].total, 0);
    assert_eq!(summaries[1].rate, None);
}

#[test]
fn empty_input_gives_empty_output() {
    assert!(group_by_period(&[]).is_empty());
    assert!(group_by_dimension_then_period(&[], &agency_channel_filter("all", "all")).is_empty());
    let total = totals(&Vec::<CallRecord>::new());
    assert_eq!(total.total, 0);
    assert_eq!(total.rate, None);
}

#[test]
fn unknown_filter_value_is_empty_not_error() {
    let summaries =
        group_by_dimension_then_period(&feed(), &agency_channel_filter("Agence Inconnue", "all"));
    assert!(summaries.is_empty());
}

#[test]
fn all_all_filter_equals_plain_grouping() {
    let filtered = group_by_dimension_then_period(&feed(), &agency_channel_filter("all", "all"));
    assert_eq!(filtered, group_by_period(&feed()));

    // No filter entries at all behaves the same.
    assert_eq!(
        group_by_dimension_then_period(&feed(), &DimensionFilter::new()),
        group_by_period(&feed())
    );
}

#[test]
fn agency_and_channel_filter_combine() {
    let summaries = group_by_dimension_then_period(
        &feed(),
        &agency_channel_filter("Agence Sud", "GMB"),
    );
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].key, "2025-02");
    assert_eq!(summaries[0].rate, Some(100.0));
}

#[test]
fn filter_on_unrelated_dimension_excludes_records_without_it() {
    let mut filter = DimensionFilter::new();
    filter.insert("societe".to_string(), Selection::Only("Groupe A".to_string()));
    assert!(group_by_dimension_then_period(&feed(), &filter).is_empty());
}

#[test]
fn entity_grouping_merges_channel_suffixes() {
    let by_label = group_by_dimension(&feed(), AGENCY);
    assert_eq!(by_label.len(), 3);

    let by_entity = group_by_entity(&feed(), AGENCY);
    assert_eq!(by_entity.len(), 2);
    assert_eq!(by_entity[0].key, "Agence Nord");
    assert_eq!(by_entity[0].answered, 50);
    assert_eq!(by_entity[0].total, 70);
    assert_eq!(by_entity[1].key, "Agence Sud");
    assert_eq!(by_entity[1].total, 40);
}

#[test]
fn zero_total_channel_reports_undefined_rate() {
    let by_channel = group_by_dimension(&feed(), CHANNEL);
    let autres = by_channel.iter().find(|s| s.key == "Autres").unwrap();
    assert_eq!(autres.rate, None);
    assert_eq!(autres.total, 0);
}

#[test]
fn normalizer_examples() {
    assert_eq!(
        normalize_dimension_label("Agence Centrale - Pages Jaunes"),
        "Agence Centrale"
    );
    assert_eq!(normalize_dimension_label("Agence Centrale"), "Agence Centrale");
}

#[test]
fn repeated_calls_are_identical() {
    let records = feed();
    assert_eq!(group_by_period(&records), group_by_period(&records));
    assert_eq!(rate_of(1, 3), rate_of(1, 3));
}
