use serde::{Deserialize, Serialize};
use std::collections::BTreeMap; // Ordered so that compound keys come out the same every time

/// Dimension name for the agency a call was routed to.
pub const AGENCY: &str = "agence";
/// Dimension name for the acquisition channel of a call.
pub const CHANNEL: &str = "canal";

/// One pre-grouped observation bucket.
///
/// `answered` is the counted subset of `total`: answered calls for the
/// answer-rate feeds, spam hits for the spam feeds. Callers must keep
/// `answered <= total`; the aggregator does not check it.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct CallRecord {
    pub period: String,
    #[serde(default)]
    pub dimensions: BTreeMap<String, String>,
    pub answered: u64,
    pub total: u64,
}

impl CallRecord {
    pub fn new(period: impl Into<String>, answered: u64, total: u64) -> Self {
        CallRecord {
            period: period.into(),
            dimensions: BTreeMap::new(),
            answered,
            total,
        }
    }

    /// Builder-style helper used by the snapshot feeds and the tests.
    pub fn with(mut self, dimension: &str, value: impl Into<String>) -> Self {
        self.dimensions.insert(dimension.to_string(), value.into());
        self
    }

    pub fn dimension(&self, name: &str) -> Option<&str> {
        self.dimensions.get(name).map(String::as_str)
    }

    pub fn is_well_formed(&self) -> bool {
        self.answered <= self.total
    }
}

/// Aggregated counts for one grouping key.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct RateSummary {
    pub key: String,
    pub answered: u64,
    pub total: u64,
    /// Percentage, `None` when `total` is zero.
    pub rate: Option<f64>,
}

/// Filter value for one dimension. `"all"` disables the filter.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            Selection::All
        } else {
            Selection::Only(raw.to_string())
        }
    }

    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => value == Some(expected.as_str()),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl From<&str> for Selection {
    fn from(raw: &str) -> Self {
        Selection::parse(raw)
    }
}

/// Exact-match filters keyed by dimension name.
pub type DimensionFilter = BTreeMap<String, Selection>;

/// Convenience constructor for an agency/channel filter.
pub fn agency_channel_filter(agency: &str, channel: &str) -> DimensionFilter {
    let mut filter = DimensionFilter::new();
    filter.insert(AGENCY.to_string(), Selection::parse(agency));
    filter.insert(CHANNEL.to_string(), Selection::parse(channel));
    filter
}
