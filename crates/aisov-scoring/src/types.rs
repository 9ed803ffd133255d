use aisov_core::{IntentCategory, LlmName, Period};
use serde::Serialize;

use crate::error::ScoringError;

/// One grouping dimension: either a specific value or the wildcard.
///
/// Serializes as `null` for [`Dimension::All`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum Dimension<T> {
    All,
    Exact(T),
}

impl<T: PartialEq> Dimension<T> {
    /// `true` for the wildcard, or when the exact value equals `value`.
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Dimension::All => true,
            Dimension::Exact(v) => v == value,
        }
    }

    pub fn exact(&self) -> Option<&T> {
        match self {
            Dimension::All => None,
            Dimension::Exact(v) => Some(v),
        }
    }
}

impl<T> From<Option<T>> for Dimension<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Dimension::All, Dimension::Exact)
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Dimension<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::All => write!(f, "ALL"),
            Dimension::Exact(v) => write!(f, "{v}"),
        }
    }
}

/// Identifies one aggregate group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupKey {
    pub brand: Dimension<String>,
    pub llm: Dimension<LlmName>,
    pub intent: Dimension<IntentCategory>,
    pub period: Period,
}

impl GroupKey {
    /// Key for one brand across all LLMs and intents.
    #[must_use]
    pub fn overall(brand: &str, period: Period) -> Self {
        Self {
            brand: Dimension::Exact(brand.to_string()),
            llm: Dimension::All,
            intent: Dimension::All,
            period,
        }
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "brand={} llm={} intent={} period={}",
            self.brand, self.llm, self.intent, self.period
        )
    }
}

/// Record counts behind the group's ratios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupCounts {
    pub mentioned: usize,
    /// Mentioned records with a rank of 1 or more.
    pub ranked: usize,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    /// Mentioned records classified with a criticism context.
    pub criticism: usize,
    /// Records where a competitor was named and the brand was not.
    pub displaced: usize,
}

/// Raw statistics for one group. Every ratio lies in `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateGroup {
    pub key: GroupKey,
    pub sample_size: usize,
    pub mention_rate: f64,
    pub avg_rank_score: f64,
    pub positive_sentiment_ratio: f64,
    pub recommendation_strength_avg: f64,
    pub counts: GroupCounts,
}

impl AggregateGroup {
    /// The four scoring components, by name.
    #[must_use]
    pub fn components(&self) -> [(&'static str, f64); 4] {
        [
            ("mention_rate", self.mention_rate),
            ("avg_rank_score", self.avg_rank_score),
            ("positive_sentiment_ratio", self.positive_sentiment_ratio),
            ("recommendation_strength_avg", self.recommendation_strength_avg),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredGroup {
    #[serde(flatten)]
    pub group: AggregateGroup,
    pub aisov_score: f64,
}

/// A group that could not be scored, with the reason.
///
/// The error serializes as its display message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupError {
    pub key: GroupKey,
    #[serde(serialize_with = "serialize_display")]
    pub error: ScoringError,
}

fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: std::fmt::Display,
    S: serde::Serializer,
{
    serializer.collect_str(value)
}

impl std::fmt::Display for GroupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// Result of scoring a batch: valid scores plus per-group failures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub scored: Vec<ScoredGroup>,
    pub errors: Vec<GroupError>,
}

impl BatchOutcome {
    #[must_use]
    pub fn find(&self, key: &GroupKey) -> Option<&ScoredGroup> {
        self.scored.iter().find(|s| &s.group.key == key)
    }

    #[must_use]
    pub fn error_for(&self, key: &GroupKey) -> Option<&GroupError> {
        self.errors.iter().find(|e| &e.key == key)
    }
}

/// `numerator / denominator`, or `0.0` when the denominator is zero.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
