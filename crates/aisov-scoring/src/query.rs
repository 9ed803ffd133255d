//! Read-only analytical views over scored groups and signal records.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use aisov_core::{IntentCategory, LlmName, Period, SignalRecord};
use serde::Serialize;

use crate::aggregator::aggregate_group;
use crate::scorer::Scorer;
use crate::types::{ratio, AggregateGroup, BatchOutcome, Dimension, GroupError, GroupKey};

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub brand: String,
    pub aisov_score: f64,
    pub sample_size: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
    /// Brands in the selection whose group could not be scored.
    pub errors: Vec<GroupError>,
}

/// Rank brands by AISOV for one LLM (or all) over one period.
///
/// Only brand-level groups with intent `ALL` are considered. Ordering is score
/// descending, then sample size descending, then brand name ascending.
#[must_use]
pub fn leaderboard(outcome: &BatchOutcome, llm: &Dimension<LlmName>, period: Period) -> Leaderboard {
    let selected = |key: &GroupKey| {
        key.brand.exact().is_some()
            && &key.llm == llm
            && key.intent == Dimension::All
            && key.period == period
    };

    let mut entries: Vec<LeaderboardEntry> = outcome
        .scored
        .iter()
        .filter(|s| selected(&s.group.key))
        .filter_map(|s| {
            s.group.key.brand.exact().map(|brand| LeaderboardEntry {
                brand: brand.clone(),
                aisov_score: s.aisov_score,
                sample_size: s.group.sample_size,
            })
        })
        .collect();

    entries.sort_by(compare_entries);

    let errors = outcome
        .errors
        .iter()
        .filter(|e| selected(&e.key))
        .cloned()
        .collect();

    Leaderboard { entries, errors }
}

/// Exact score descending; only bit-equal scores fall through to the tie-breaks.
fn compare_entries(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.aisov_score
        .total_cmp(&a.aisov_score)
        .then_with(|| b.sample_size.cmp(&a.sample_size))
        .then_with(|| a.brand.cmp(&b.brand))
}

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

/// Which slice of the data a trend follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendFilter {
    pub brand: String,
    pub llm: Dimension<LlmName>,
    pub intent: Dimension<IntentCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub period: Period,
    /// `None` when the period has no data or could not be scored.
    pub aisov_score: Option<f64>,
    pub sample_size: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trend {
    pub points: Vec<TrendPoint>,
    pub errors: Vec<GroupError>,
}

/// AISOV per requested period, in ascending period order.
///
/// There is exactly one point per requested period. Periods without records
/// are explicit `None` points, not omitted and not errors.
#[must_use]
pub fn trend(
    records: &[SignalRecord],
    scorer: &Scorer,
    filter: &TrendFilter,
    periods: &[Period],
) -> Trend {
    let mut ordered = periods.to_vec();
    ordered.sort();

    let slice: Vec<&SignalRecord> = records
        .iter()
        .filter(|r| {
            r.brand_name == filter.brand
                && filter.llm.matches(&r.llm_name)
                && filter.intent.matches(&r.intent_category)
        })
        .collect();

    let mut out = Trend::default();
    for period in ordered {
        let key = GroupKey {
            brand: Dimension::Exact(filter.brand.clone()),
            llm: filter.llm.clone(),
            intent: filter.intent.clone(),
            period,
        };
        let group = aggregate_group(
            key,
            slice.iter().copied().filter(|r| period.contains(r.timestamp)),
        );

        let aisov_score = if group.sample_size == 0 {
            None
        } else {
            match scorer.score(&group) {
                Ok(score) => Some(score),
                Err(error) => {
                    tracing::warn!(key = %group.key, error = %error, "trend point could not be scored");
                    out.errors.push(GroupError {
                        key: group.key.clone(),
                        error,
                    });
                    None
                }
            }
        };

        out.points.push(TrendPoint {
            period,
            aisov_score,
            sample_size: group.sample_size,
        });
    }
    out
}

// ---------------------------------------------------------------------------
// Per-group breakdowns
// ---------------------------------------------------------------------------

/// Sentiment shares over mentioned records. All zero when nothing was mentioned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentDistribution {
    pub mentioned: usize,
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

#[must_use]
pub fn sentiment_distribution(group: &AggregateGroup) -> SentimentDistribution {
    let c = &group.counts;
    SentimentDistribution {
        mentioned: c.mentioned,
        positive: ratio(c.positive, c.mentioned),
        neutral: ratio(c.neutral, c.mentioned),
        negative: ratio(c.negative, c.mentioned),
    }
}

/// Share of records where a competitor was named and the brand was not.
#[must_use]
pub fn displacement_rate(group: &AggregateGroup) -> f64 {
    ratio(group.counts.displaced, group.sample_size)
}

/// `0.5 * negative_ratio + 0.5 * criticism_ratio`, both over mentioned records.
#[must_use]
pub fn risk_index(group: &AggregateGroup) -> f64 {
    let c = &group.counts;
    0.5 * ratio(c.negative, c.mentioned) + 0.5 * ratio(c.criticism, c.mentioned)
}

// ---------------------------------------------------------------------------
// Competitor displacement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitorDisplacement {
    pub competitor: String,
    /// Appearances in responses that did not mention the brand.
    pub displacement_count: usize,
    pub appearances: usize,
    pub displacement_rate: f64,
}

/// How often each named competitor appears instead of the brand.
///
/// `records` should already be limited to the focal brand. Sorted by
/// displacement rate descending, then competitor name.
#[must_use]
pub fn competitor_displacement<'a, I>(records: I) -> Vec<CompetitorDisplacement>
where
    I: IntoIterator<Item = &'a SignalRecord>,
{
    let mut tally: BTreeMap<&str, (usize, usize)> = BTreeMap::new();

    for record in records {
        let mut seen: Vec<&str> = Vec::with_capacity(record.competitors.len());
        for name in &record.competitors {
            let name = name.trim();
            if name.is_empty() || seen.contains(&name) {
                continue;
            }
            seen.push(name);
            let entry = tally.entry(name).or_default();
            entry.1 += 1;
            if !record.brand_mentioned {
                entry.0 += 1;
            }
        }
    }

    let mut out: Vec<CompetitorDisplacement> = tally
        .into_iter()
        .map(|(name, (displaced, appearances))| CompetitorDisplacement {
            competitor: name.to_string(),
            displacement_count: displaced,
            appearances,
            displacement_rate: ratio(displaced, appearances),
        })
        .collect();

    out.sort_by(|a, b| {
        b.displacement_rate
            .total_cmp(&a.displacement_rate)
            .then_with(|| a.competitor.cmp(&b.competitor))
    });
    out
}
