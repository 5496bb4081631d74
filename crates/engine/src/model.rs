use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Revisions and cache buckets
// ---------------------------------------------------------------------------

/// One of the two API revisions under comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Revision {
    /// The pre-migration revision ("B").
    Old,
    /// The post-migration revision ("C").
    New,
}

impl Revision {
    /// Column/iteration order for snapshots and reports.
    pub const ALL: [Revision; 2] = [Revision::Old, Revision::New];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Old => "old",
            Self::New => "new",
        }
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Cache classification of one response, derived from `extraInfos.isCache`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBucket {
    Hit,
    Miss,
    /// `isCache` absent from the response.
    Unknown,
}

impl CacheBucket {
    pub const ALL: [CacheBucket; 3] = [CacheBucket::Hit, CacheBucket::Miss, CacheBucket::Unknown];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Hit => "cache_hit",
            Self::Miss => "cache_miss",
            Self::Unknown => "no_cache_info",
        }
    }

    /// Classify the wire flag: present-and-true, present-and-false, absent.
    pub fn from_flag(is_cache: Option<bool>) -> Self {
        match is_cache {
            Some(true) => Self::Hit,
            Some(false) => Self::Miss,
            None => Self::Unknown,
        }
    }
}

impl std::fmt::Display for CacheBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Information types
// ---------------------------------------------------------------------------

/// Closed set of result categories returned by the search backend.
///
/// Wire spelling is SCREAMING_SNAKE_CASE (`NEWS`, `INV_NEWS`, …). Strings
/// outside this set parse to `None` and are skipped by rule lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InfoType {
    News,
    Report,
    Notice,
    Cfh,
    Law,
    Bond,
    Wechat,
    Interaction,
    InvNews,
    HotNews,
}

impl InfoType {
    pub const ALL: [InfoType; 10] = [
        InfoType::News,
        InfoType::Report,
        InfoType::Notice,
        InfoType::Cfh,
        InfoType::Law,
        InfoType::Bond,
        InfoType::Wechat,
        InfoType::Interaction,
        InfoType::InvNews,
        InfoType::HotNews,
    ];

    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::News => "NEWS",
            Self::Report => "REPORT",
            Self::Notice => "NOTICE",
            Self::Cfh => "CFH",
            Self::Law => "LAW",
            Self::Bond => "BOND",
            Self::Wechat => "WECHAT",
            Self::Interaction => "INTERACTION",
            Self::InvNews => "INV_NEWS",
            Self::HotNews => "HOT_NEWS",
        }
    }

    /// Parse a wire string. Unknown categories are `None`, not an error.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.wire_name() == s)
    }
}

impl std::fmt::Display for InfoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

// ---------------------------------------------------------------------------
// Result records
// ---------------------------------------------------------------------------

/// One result record as returned by either revision.
///
/// Absent and JSON-null wire fields both deserialize to the empty string;
/// emptiness is exactly what validation checks, so the "missing key" vs
/// "empty value" distinction is erased here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultRecord {
    #[serde(deserialize_with = "null_to_empty")]
    pub id: String,
    #[serde(deserialize_with = "null_to_empty")]
    pub title: String,
    #[serde(rename = "showTime", deserialize_with = "null_to_empty")]
    pub show_time: String,
    #[serde(deserialize_with = "null_to_empty")]
    pub source: String,
    #[serde(rename = "informationType", deserialize_with = "null_to_empty")]
    pub information_type: String,
    #[serde(rename = "jumpUrl", deserialize_with = "null_to_empty")]
    pub jump_url: String,
    #[serde(rename = "currentQuery", deserialize_with = "null_to_empty")]
    pub current_query: String,
    #[serde(rename = "originalQuery", deserialize_with = "null_to_empty")]
    pub original_query: String,
}

impl ResultRecord {
    /// The record's category, when it is one of the closed set.
    pub fn info_type(&self) -> Option<InfoType> {
        InfoType::parse(&self.information_type)
    }
}

fn null_to_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Diff reports
// ---------------------------------------------------------------------------

/// One sampled id sequence plus the correlation id of the probe that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSample {
    pub ids: Vec<String>,
    pub correlation_id: String,
}

/// Positional mismatch between two sequences sharing the same id set.
/// Trailing positions past the shorter sequence carry an empty counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderChange {
    pub position: usize,
    pub old_id: String,
    pub new_id: String,
}

/// Structured difference between one old sample and one new sample.
///
/// Invariants: `total_diff_count = set_diff_count + order_diff_count`;
/// `order_changes` is only populated when the two id sets are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    pub set_diff: bool,
    pub order_diff: bool,
    pub only_in_old: Vec<String>,
    pub only_in_new: Vec<String>,
    pub order_changes: Vec<OrderChange>,
    pub set_diff_count: usize,
    pub order_diff_count: usize,
    pub total_diff_count: usize,
}

impl DiffReport {
    pub fn is_clean(&self) -> bool {
        self.total_diff_count == 0
    }
}

/// The least-different (old sample, new sample) pairing across all samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestPairing {
    pub report: DiffReport,
    pub old_correlation_id: String,
    pub new_correlation_id: String,
    /// Which combination won, e.g. `old_2xnew_1` (1-based sample indices).
    pub combo_label: String,
}
