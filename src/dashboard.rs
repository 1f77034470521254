//! Data projections behind each dashboard panel.
//!
//! Every view is a plain value built from a [`DashboardSnapshot`]; nothing here
//! keeps global state between calls.

use crate::aggregator::{
    group_by_dimension_then_period, group_by_period, merge_summaries, rate_of, totals,
};
use crate::record::{AGENCY, CHANNEL, CallRecord, DimensionFilter, RateSummary, Selection};
use crate::snapshot::{
    AgencyNode, ChannelPerf, CompanyNode, DashboardSnapshot, DayHourRate, Durations, NatureCount,
    NumberTypeCount,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Display order of the channels in company and agency rows.
pub const CHANNEL_ORDER: [&str; 4] = ["GMB", "Pages Jaunes", "Store Locator", "Autres"];

/// Weekdays shown on the hourly chart.
pub const WEEKDAYS: [&str; 5] = ["Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi"];

/// First and last opening hours shown on the hourly chart.
pub const FIRST_HOUR: u8 = 8;
pub const LAST_HOUR: u8 = 20;

/// Headline figures shown above the charts.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GlobalStats {
    pub spam_rate: Option<f64>,
    pub total_calls: u64,
    pub answer_rate: Option<f64>,
    pub non_spam_calls: u64,
}

impl GlobalStats {
    pub fn compute(snapshot: &DashboardSnapshot) -> Self {
        let spam = totals(&snapshot.spam_by_month());
        let answered = totals(&snapshot.answered_by_month());

        GlobalStats {
            spam_rate: spam.rate,
            total_calls: spam.total,
            answer_rate: answered.rate,
            non_spam_calls: answered.total,
        }
    }
}

/// Filter state of the answer-rate chart.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnswerRateView {
    pub agency: Selection,
    pub channel: Selection,
}

impl AnswerRateView {
    pub fn new(agency: &str, channel: &str) -> Self {
        AnswerRateView {
            agency: Selection::parse(agency),
            channel: Selection::parse(channel),
        }
    }

    pub fn filter(&self) -> DimensionFilter {
        let mut filter = DimensionFilter::new();
        filter.insert(AGENCY.to_string(), self.agency.clone());
        filter.insert(CHANNEL.to_string(), self.channel.clone());
        filter
    }

    /// Monthly answer rate for the current filters.
    ///
    /// Without any filter the precomputed global feed is used as is.
    pub fn series(&self, snapshot: &DashboardSnapshot) -> Vec<RateSummary> {
        if self.agency.is_all() && self.channel.is_all() {
            group_by_period(&snapshot.answered_by_month())
        } else {
            group_by_dimension_then_period(&snapshot.answered_by_agency_channel(), &self.filter())
        }
    }

    /// Totals over the series currently shown.
    pub fn stats(&self, snapshot: &DashboardSnapshot) -> RateSummary {
        merge_summaries("total", &self.series(snapshot))
    }
}

/// Choices offered by the agency and channel dropdowns, in snapshot order.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct FilterOptions {
    pub agencies: Vec<String>,
    pub channels: Vec<String>,
}

impl FilterOptions {
    pub fn from_snapshot(snapshot: &DashboardSnapshot) -> Self {
        FilterOptions {
            agencies: snapshot.liste_agences.clone(),
            channels: snapshot.liste_canaux.clone(),
        }
    }
}

/// Rates laid out as periods × dimension values, ready for a multi-line chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChannelPivot {
    pub periods: Vec<String>,
    pub series: Vec<PivotSeries>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PivotSeries {
    pub label: String,
    pub rates: Vec<Option<f64>>,
}

impl ChannelPivot {
    /// Series follow the first appearance of each value; periods are sorted.
    /// A period with no record for a value gets `None`.
    pub fn build(records: &[CallRecord], dimension: &str) -> Self {
        let mut labels: Vec<String> = Vec::new();
        for record in records {
            if let Some(value) = record.dimension(dimension) {
                if !labels.iter().any(|l| l == value) {
                    labels.push(value.to_string());
                }
            }
        }

        let periods: Vec<String> = group_by_period(records).into_iter().map(|s| s.key).collect();

        let series = labels
            .into_iter()
            .map(|label| {
                let mut filter = DimensionFilter::new();
                filter.insert(dimension.to_string(), Selection::Only(label.clone()));
                let by_period: BTreeMap<String, Option<f64>> =
                    group_by_dimension_then_period(records, &filter)
                        .into_iter()
                        .map(|s| (s.key, s.rate))
                        .collect();
                let rates = periods
                    .iter()
                    .map(|p| by_period.get(p).copied().flatten())
                    .collect();
                PivotSeries { label, rates }
            })
            .collect();

        ChannelPivot { periods, series }
    }
}

/// Answer rate per weekday and opening hour.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeekdayHourGrid {
    pub hours: Vec<u8>,
    pub days: Vec<PivotSeries>,
}

impl WeekdayHourGrid {
    pub fn build(slots: &[DayHourRate]) -> Self {
        let hours: Vec<u8> = (FIRST_HOUR..=LAST_HOUR).collect();

        let days = WEEKDAYS
            .iter()
            .map(|day| {
                let rates = hours
                    .iter()
                    .map(|hour| {
                        slots
                            .iter()
                            .find(|s| s.jour_fr == *day && s.heure == *hour)
                            .and_then(slot_rate)
                    })
                    .collect();
                PivotSeries {
                    label: day.to_string(),
                    rates,
                }
            })
            .collect();

        WeekdayHourGrid { hours, days }
    }
}

// Raw counts win over the stored percentage when both are present.
fn slot_rate(slot: &DayHourRate) -> Option<f64> {
    match (slot.decroche, slot.total) {
        (Some(answered), Some(total)) => rate_of(answered, total),
        _ => slot.taux_decroche,
    }
}

/// One-hour window with its spam call count.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PeakSlot {
    pub label: String,
    pub start: u8,
    pub end: u8,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedNumber {
    pub rank: usize,
    pub number: String,
    pub count: u64,
    pub percentage: f64,
}

/// Pages Jaunes spam panel: natures, number types, mean durations,
/// peak hours and the most frequent calling numbers.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpamOverview {
    pub natures: Vec<NatureCount>,
    pub number_types: Vec<NumberTypeCount>,
    pub durations: Durations,
    pub peak_hours: Vec<PeakSlot>,
    pub top_numbers: Vec<RankedNumber>,
}

impl SpamOverview {
    /// `None` when the snapshot carries no spam analysis.
    pub fn from_snapshot(snapshot: &DashboardSnapshot) -> Option<Self> {
        let analysis = snapshot.spam_pj_analysis.as_ref()?;

        let peak_hours = analysis
            .heures_pic
            .iter()
            .map(|peak| {
                let end = peak.heure.saturating_add(1);
                PeakSlot {
                    label: format!("{}h - {}h", peak.heure, end),
                    start: peak.heure,
                    end,
                    count: peak.count,
                }
            })
            .collect();

        // Listed order is the rank order.
        let top_numbers = analysis
            .top_numeros
            .iter()
            .enumerate()
            .map(|(index, top)| RankedNumber {
                rank: index + 1,
                number: top.numero.clone(),
                count: top.count,
                percentage: top.percentage,
            })
            .collect();

        Some(SpamOverview {
            natures: analysis.nature_spam.clone(),
            number_types: analysis.type_numero.clone(),
            durations: analysis.durees.clone(),
            peak_hours,
            top_numbers,
        })
    }
}

/// Colour band of an answer rate.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RateClass {
    Excellent,
    Good,
    Average,
    Poor,
}

impl RateClass {
    pub fn classify(rate: f64) -> Self {
        if rate >= 90.0 {
            RateClass::Excellent
        } else if rate >= 75.0 {
            RateClass::Good
        } else if rate >= 60.0 {
            RateClass::Average
        } else {
            RateClass::Poor
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            RateClass::Excellent => "rate-excellent",
            RateClass::Good => "rate-good",
            RateClass::Average => "rate-average",
            RateClass::Poor => "rate-poor",
        }
    }
}

/// Volume and answer rate of one channel inside a company or agency row.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChannelCell {
    pub channel: String,
    pub volume: u64,
    pub rate: Option<f64>,
}

fn channel_cells(
    volumes: &BTreeMap<String, u64>,
    perf: &BTreeMap<String, ChannelPerf>,
) -> Vec<ChannelCell> {
    CHANNEL_ORDER
        .iter()
        .filter_map(|channel| {
            let volume = volumes.get(*channel).copied().unwrap_or(0);
            if volume == 0 {
                return None;
            }
            Some(ChannelCell {
                channel: channel.to_string(),
                volume,
                rate: perf.get(*channel).map(|p| p.taux),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AgencyRow {
    pub name: String,
    pub volume: u64,
    pub rate: f64,
    pub class: RateClass,
    pub channels: Vec<ChannelCell>,
}

impl From<&AgencyNode> for AgencyRow {
    fn from(node: &AgencyNode) -> Self {
        AgencyRow {
            name: node.nom.clone(),
            volume: node.total_volume,
            rate: node.taux_global,
            class: RateClass::classify(node.taux_global),
            channels: channel_cells(&node.volume_canaux, &node.perf_canaux),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompanyRow {
    pub rank: usize,
    pub name: String,
    pub volume: u64,
    pub rate: f64,
    pub class: RateClass,
    pub channels: Vec<ChannelCell>,
    pub agencies: Vec<AgencyRow>,
}

/// Companies ranked by call volume, each with its agencies.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct CompanyRanking {
    pub companies: Vec<CompanyRow>,
}

impl CompanyRanking {
    pub fn build(hierarchy: &BTreeMap<String, CompanyNode>) -> Self {
        let mut entries: Vec<(&String, &CompanyNode)> = hierarchy.iter().collect();
        // BTreeMap iteration is by name, so the stable sort breaks ties by name.
        entries.sort_by(|a, b| b.1.total_volume.cmp(&a.1.total_volume));

        let companies = entries
            .into_iter()
            .enumerate()
            .map(|(index, (name, node))| CompanyRow {
                rank: index + 1,
                name: name.clone(),
                volume: node.total_volume,
                rate: node.taux_global,
                class: RateClass::classify(node.taux_global),
                channels: channel_cells(&node.volume_canaux, &node.perf_canaux),
                agencies: node.agences.iter().map(AgencyRow::from).collect(),
            })
            .collect();

        CompanyRanking { companies }
    }

    /// Companies whose name or one of whose agencies contains `term`, ignoring case.
    /// Ranks are kept from the full ranking.
    pub fn search(&self, term: &str) -> Vec<&CompanyRow> {
        let term = term.trim().to_lowercase();
        self.companies
            .iter()
            .filter(|company| {
                term.is_empty()
                    || company.name.to_lowercase().contains(&term)
                    || company
                        .agencies
                        .iter()
                        .any(|a| a.name.to_lowercase().contains(&term))
            })
            .collect()
    }
}
