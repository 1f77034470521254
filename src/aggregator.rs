use crate::labels::normalize_dimension_label;
use crate::record::{CallRecord, DimensionFilter, RateSummary};
use std::collections::BTreeMap;

/// Separator used when a summary key is built from several dimension values.
pub const KEY_SEPARATOR: &str = " / ";

/// Percentage of `answered` over `total`.
///
/// Returns `None` when `total` is zero. Every rate in this crate goes through
/// this function so there is exactly one zero-denominator policy.
///
/// # Examples
/// ```
/// use calltrack::aggregator::rate_of;
///
/// assert_eq!(rate_of(1, 4), Some(25.0));
/// assert_eq!(rate_of(0, 0), None);
/// ```
pub fn rate_of(answered: u64, total: u64) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(answered as f64 / total as f64 * 100.0)
    }
}

/// Groups records by the key returned from `key_fn` and sums their counts.
///
/// Records for which `key_fn` returns `None` are skipped. The output is sorted
/// by key, one summary per distinct key. Sums saturate at `u64::MAX`.
pub fn group_by<'a, I, F>(records: I, key_fn: F) -> Vec<RateSummary>
where
    I: IntoIterator<Item = &'a CallRecord>,
    F: Fn(&CallRecord) -> Option<String>,
{
    let mut groups: BTreeMap<String, (u64, u64)> = BTreeMap::new();

    for record in records {
        if let Some(key) = key_fn(record) {
            let entry = groups.entry(key).or_insert((0, 0));
            entry.0 = entry.0.saturating_add(record.answered);
            entry.1 = entry.1.saturating_add(record.total);
        }
    }

    groups
        .into_iter()
        .map(|(key, (answered, total))| RateSummary {
            key,
            answered,
            total,
            rate: rate_of(answered, total),
        })
        .collect()
}

/// Groups records strictly by period, ascending.
///
/// # Examples
/// ```
/// use calltrack::aggregator::group_by_period;
/// use calltrack::record::CallRecord;
///
/// let records = vec![
///     CallRecord::new("2025-01", 3, 10),
///     CallRecord::new("2025-01", 7, 10),
///     CallRecord::new("2025-02", 0, 0),
/// ];
/// let summaries = group_by_period(&records);
/// assert_eq!(summaries[0].rate, Some(50.0));
/// assert_eq!(summaries[1].rate, None);
/// ```
pub fn group_by_period(records: &[CallRecord]) -> Vec<RateSummary> {
    group_by(records, |r| Some(r.period.clone()))
}

/// Keeps only the records that satisfy every dimension filter.
pub fn apply_filter<'a>(records: &'a [CallRecord], filter: &DimensionFilter) -> Vec<&'a CallRecord> {
    records
        .iter()
        .filter(|record| {
            filter
                .iter()
                .all(|(dimension, selection)| selection.matches(record.dimension(dimension)))
        })
        .collect()
}

/// Filters by dimension, then groups the remaining records by period.
///
/// A filter value that does not occur in the data yields an empty vector.
pub fn group_by_dimension_then_period(
    records: &[CallRecord],
    filter: &DimensionFilter,
) -> Vec<RateSummary> {
    group_by(apply_filter(records, filter), |r| Some(r.period.clone()))
}

/// Groups by the value of one dimension. Records without it are skipped.
pub fn group_by_dimension(records: &[CallRecord], dimension: &str) -> Vec<RateSummary> {
    group_by(records, |r| r.dimension(dimension).map(str::to_string))
}

/// Groups by several dimensions at once, e.g. agency and channel.
///
/// The key joins the values with [`KEY_SEPARATOR`] in the order given. A record
/// missing any of the dimensions is skipped.
pub fn group_by_dimensions(records: &[CallRecord], dimensions: &[&str]) -> Vec<RateSummary> {
    group_by(records, |r| {
        let parts: Option<Vec<&str>> = dimensions.iter().map(|d| r.dimension(d)).collect();
        parts.map(|p| p.join(KEY_SEPARATOR))
    })
}

/// Groups by the base entity name of a dimension, with channel suffixes stripped.
///
/// "Agence Nord - GMB" and "Agence Nord - Pages Jaunes" end up in the same group.
pub fn group_by_entity(records: &[CallRecord], dimension: &str) -> Vec<RateSummary> {
    group_by(records, |r| r.dimension(dimension).map(normalize_dimension_label))
}

/// One summary over the whole input, keyed `"total"`.
pub fn totals<'a, I>(records: I) -> RateSummary
where
    I: IntoIterator<Item = &'a CallRecord>,
{
    let (answered, total) = records.into_iter().fold((0u64, 0u64), |(a, t), r| {
        (a.saturating_add(r.answered), t.saturating_add(r.total))
    });

    RateSummary {
        key: "total".to_string(),
        answered,
        total,
        rate: rate_of(answered, total),
    }
}

/// Folds already grouped summaries into one, under `key`.
pub fn merge_summaries(key: impl Into<String>, summaries: &[RateSummary]) -> RateSummary {
    let (answered, total) = summaries.iter().fold((0u64, 0u64), |(a, t), s| {
        (a.saturating_add(s.answered), t.saturating_add(s.total))
    });

    RateSummary {
        key: key.into(),
        answered,
        total,
        rate: rate_of(answered, total),
    }
}

/// Rate over the last `n` distinct periods, by sort order.
///
/// The key reads `"<first>..<last>"`. Returns `None` when `n` is zero or there
/// are no records.
pub fn rate_over_last_periods(records: &[CallRecord], n: usize) -> Option<RateSummary> {
    if n == 0 {
        return None;
    }

    let by_period = group_by_period(records);
    let window = &by_period[by_period.len().saturating_sub(n)..];
    let first = window.first()?;
    let last = window.last()?;

    Some(merge_summaries(format!("{}..{}", first.key, last.key), window))
}
