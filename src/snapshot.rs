use crate::error::Result;
use crate::record::{AGENCY, CHANNEL, CallRecord};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Monthly spam counts, optionally split by channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpamMonth {
    pub mois: String,
    #[serde(default)]
    pub canal: Option<String>,
    pub spam: u64,
    pub total: u64,
    #[serde(default)]
    pub taux_spam: Option<f64>,
}

/// Monthly answered counts over non-spam calls, optionally split by agency and channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerMonth {
    pub mois: String,
    #[serde(default)]
    pub agence: Option<String>,
    #[serde(default)]
    pub canal: Option<String>,
    pub decroche: u64,
    pub total: u64,
    #[serde(default)]
    pub taux_decroche: Option<f64>,
}

/// Answer rate for one weekday and hour slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayHourRate {
    pub jour_fr: String,
    pub heure: u8,
    #[serde(default)]
    pub decroche: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub taux_decroche: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChannelPerf {
    pub taux: f64,
}

/// One agency row of the company hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgencyNode {
    pub nom: String,
    pub total_volume: u64,
    pub taux_global: f64,
    #[serde(default)]
    pub volume_canaux: BTreeMap<String, u64>,
    #[serde(default)]
    pub perf_canaux: BTreeMap<String, ChannelPerf>,
}

/// One company of the hierarchy with its agencies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanyNode {
    pub total_volume: u64,
    pub taux_global: f64,
    #[serde(default)]
    pub volume_canaux: BTreeMap<String, u64>,
    #[serde(default)]
    pub perf_canaux: BTreeMap<String, ChannelPerf>,
    #[serde(default)]
    pub agences: Vec<AgencyNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NatureCount {
    pub nature: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NumberTypeCount {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Durations {
    pub conversation_moy: f64,
    pub sonnerie_moy: f64,
    pub totale_moy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeakHour {
    pub heure: u8,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopNumber {
    pub numero: String,
    pub count: u64,
    pub percentage: f64,
}

/// Breakdown of spam received through the Pages Jaunes channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SpamBreakdown {
    #[serde(default)]
    pub nature_spam: Vec<NatureCount>,
    #[serde(default)]
    pub type_numero: Vec<NumberTypeCount>,
    #[serde(default)]
    pub durees: Durations,
    #[serde(default)]
    pub heures_pic: Vec<PeakHour>,
    #[serde(default)]
    pub top_numeros: Vec<TopNumber>,
}

/// The precomputed `dashboard_data.json` snapshot.
///
/// Only the keys the dashboard reads are modelled; anything else is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub liste_agences: Vec<String>,
    #[serde(default)]
    pub liste_canaux: Vec<String>,
    #[serde(default)]
    pub spam_global_mois: Vec<SpamMonth>,
    #[serde(default)]
    pub spam_par_canal_mois: Vec<SpamMonth>,
    #[serde(default)]
    pub decroche_global_mois: Vec<AnswerMonth>,
    #[serde(default)]
    pub decroche_par_agence_canal_mois: Vec<AnswerMonth>,
    #[serde(default)]
    pub decroche_jour_heure: Vec<DayHourRate>,
    #[serde(default)]
    pub hierarchy_combined: BTreeMap<String, CompanyNode>,
    #[serde(default)]
    pub spam_pj_analysis: Option<SpamBreakdown>,
}

impl DashboardSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: DashboardSnapshot = serde_json::from_str(json)?;
        snapshot.warn_malformed();
        Ok(snapshot)
    }

    /// Answered calls per month, all agencies and channels together.
    pub fn answered_by_month(&self) -> Vec<CallRecord> {
        self.decroche_global_mois.iter().map(answer_record).collect()
    }

    /// Answered calls per month, agency and channel.
    pub fn answered_by_agency_channel(&self) -> Vec<CallRecord> {
        self.decroche_par_agence_canal_mois
            .iter()
            .map(answer_record)
            .collect()
    }

    /// Spam hits per month; `answered` carries the spam count.
    pub fn spam_by_month(&self) -> Vec<CallRecord> {
        self.spam_global_mois.iter().map(spam_record).collect()
    }

    /// Spam hits per month and channel.
    pub fn spam_by_channel(&self) -> Vec<CallRecord> {
        self.spam_par_canal_mois.iter().map(spam_record).collect()
    }

    // Rows with more answered (or spam) calls than calls are kept as they are.
    fn warn_malformed(&self) {
        let feeds = [
            ("spam", self.spam_by_month()),
            ("spam per channel", self.spam_by_channel()),
            ("answered", self.answered_by_month()),
            ("answered per agency/channel", self.answered_by_agency_channel()),
        ];
        for (feed, records) in feeds.iter() {
            for record in records.iter().filter(|r| !r.is_well_formed()) {
                warn!(
                    "{} count above total for {} {:?}: {}/{}",
                    feed, record.period, record.dimensions, record.answered, record.total
                );
            }
        }
    }
}

fn answer_record(month: &AnswerMonth) -> CallRecord {
    let mut record = CallRecord::new(month.mois.clone(), month.decroche, month.total);
    if let Some(agence) = &month.agence {
        record = record.with(AGENCY, agence.clone());
    }
    if let Some(canal) = &month.canal {
        record = record.with(CHANNEL, canal.clone());
    }
    record
}

fn spam_record(month: &SpamMonth) -> CallRecord {
    let record = CallRecord::new(month.mois.clone(), month.spam, month.total);
    match &month.canal {
        Some(canal) => record.with(CHANNEL, canal.clone()),
        None => record,
    }
}

/// Reads and parses a snapshot file.
///
/// # Examples
/// ```no_run
/// use calltrack::snapshot::load_snapshot;
///
/// match load_snapshot("dashboard_data.json") {
///     Ok(snapshot) => println!("{} agencies", snapshot.liste_agences.len()),
///     Err(e) => eprintln!("Error loading snapshot: {}", e),
/// }
/// ```
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<DashboardSnapshot> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let snapshot = DashboardSnapshot::from_json(&contents)?;

    info!(
        "loaded snapshot {}: {} agencies, {} channels, {} agency/channel rows",
        path.display(),
        snapshot.liste_agences.len(),
        snapshot.liste_canaux.len(),
        snapshot.decroche_par_agence_canal_mois.len()
    );

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_default_to_empty() {
        let snapshot = DashboardSnapshot::from_json("{}").unwrap();
        assert!(snapshot.liste_agences.is_empty());
        assert!(snapshot.hierarchy_combined.is_empty());
        assert!(snapshot.spam_pj_analysis.is_none());
    }

    #[test]
    fn negative_counts_are_rejected() {
        let json = r#"{"decroche_global_mois":[{"mois":"2025-01","decroche":-1,"total":3}]}"#;
        assert!(DashboardSnapshot::from_json(json).is_err());
    }

    #[test]
    fn rows_above_total_are_kept() {
        let json = r#"{
            "decroche_global_mois":[
                {"mois":"2025-01","decroche":12,"total":10},
                {"mois":"2025-02","decroche":5,"total":10}
            ],
            "spam_global_mois":[{"mois":"2025-01","spam":7,"total":3}]
        }"#;
        let snapshot = DashboardSnapshot::from_json(json).unwrap();

        let answered = snapshot.answered_by_month();
        assert_eq!(answered.len(), 2);
        assert!(!answered[0].is_well_formed());
        assert_eq!(answered[0].answered, 12);

        let summaries = crate::aggregator::group_by_period(&answered);
        assert_eq!(summaries[0].rate, Some(120.0));
        let total = crate::aggregator::totals(&answered);
        assert_eq!(total.answered, 17);
        assert_eq!(total.total, 20);

        assert_eq!(snapshot.spam_by_month()[0].answered, 7);
    }

    #[test]
    fn spam_rows_map_channel_dimension() {
        let json = r#"{"spam_par_canal_mois":[
            {"mois":"2025-01","canal":"GMB","spam":2,"total":20,"taux_spam":10.0}
        ]}"#;
        let snapshot = DashboardSnapshot::from_json(json).unwrap();
        let records = snapshot.spam_by_channel();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].dimension(CHANNEL), Some("GMB"));
        assert_eq!(records[0].answered, 2);
        assert_eq!(records[0].total, 20);
    }
}
