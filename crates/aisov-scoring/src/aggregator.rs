//! Groups signal records and computes per-group raw statistics.

use std::collections::BTreeMap;

use aisov_core::{ContextType, Granularity, Period, Sentiment, SignalRecord};
use chrono::NaiveDate;

use crate::types::{ratio, AggregateGroup, Dimension, GroupCounts, GroupKey};

/// Which dimensions to group by, over which period.
///
/// Dimensions that are not grouped by collapse to [`Dimension::All`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingSpec {
    pub by_brand: bool,
    pub by_llm: bool,
    pub by_intent: bool,
    pub period: Period,
    /// Split the period into buckets. `None` treats the whole period as one bucket.
    pub granularity: Option<Granularity>,
}

impl GroupingSpec {
    /// One group per brand over the whole period.
    #[must_use]
    pub fn per_brand(period: Period) -> Self {
        Self {
            by_brand: true,
            by_llm: false,
            by_intent: false,
            period,
            granularity: None,
        }
    }

    #[must_use]
    pub fn with_llm(mut self) -> Self {
        self.by_llm = true;
        self
    }

    #[must_use]
    pub fn with_intent(mut self) -> Self {
        self.by_intent = true;
        self
    }

    #[must_use]
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = Some(granularity);
        self
    }

    fn buckets(&self) -> Vec<Period> {
        match self.granularity {
            Some(g) => self.period.buckets(g),
            None => vec![self.period],
        }
    }

    fn key_for(&self, record: &SignalRecord, bucket: Period) -> GroupKey {
        GroupKey {
            brand: if self.by_brand {
                Dimension::Exact(record.brand_name.clone())
            } else {
                Dimension::All
            },
            llm: if self.by_llm {
                Dimension::Exact(record.llm_name)
            } else {
                Dimension::All
            },
            intent: if self.by_intent {
                Dimension::Exact(record.intent_category)
            } else {
                Dimension::All
            },
            period: bucket,
        }
    }
}

/// Aggregate records into one group per distinct key present in the data.
///
/// Records outside the grouping period are ignored. A key with no records
/// produces no group. Output is ordered by [`GroupKey`].
#[must_use]
pub fn aggregate(records: &[SignalRecord], spec: &GroupingSpec) -> Vec<AggregateGroup> {
    let buckets = spec.buckets();
    let mut grouped: BTreeMap<GroupKey, Vec<&SignalRecord>> = BTreeMap::new();
    let mut out_of_period = 0_usize;

    for record in records {
        let Some(bucket) = find_bucket(&buckets, record.timestamp.date_naive()) else {
            out_of_period += 1;
            continue;
        };
        grouped
            .entry(spec.key_for(record, bucket))
            .or_default()
            .push(record);
    }

    tracing::debug!(
        records = records.len(),
        out_of_period,
        groups = grouped.len(),
        period = %spec.period,
        "aggregated signal records"
    );

    grouped
        .into_iter()
        .map(|(key, members)| aggregate_group(key, members))
        .collect()
}

/// The overall, per-LLM, and per-intent groups for every brand in the period.
#[must_use]
pub fn standard_dimensions(records: &[SignalRecord], period: Period) -> Vec<AggregateGroup> {
    let overall = GroupingSpec::per_brand(period);
    let mut groups = aggregate(records, &overall);
    groups.extend(aggregate(records, &overall.with_llm()));
    groups.extend(aggregate(records, &overall.with_intent()));
    groups
}

fn find_bucket(buckets: &[Period], date: NaiveDate) -> Option<Period> {
    let idx = buckets.partition_point(|b| b.end() < date);
    buckets.get(idx).filter(|b| b.contains_date(date)).copied()
}

/// Compute the statistics for one group from its records.
///
/// An empty record set yields `sample_size = 0` with every ratio at `0.0`;
/// callers use that to represent a gap.
///
/// Rank score averages `1 / rank` over mentioned records with a rank. A group
/// without any ranked mention scores `0.0` rather than being excluded, so the
/// composite stays computable.
pub fn aggregate_group<'a, I>(key: GroupKey, records: I) -> AggregateGroup
where
    I: IntoIterator<Item = &'a SignalRecord>,
{
    let mut counts = GroupCounts::default();
    let mut sample_size = 0_usize;
    let mut rank_score_sum = 0.0_f64;
    let mut recommendation_sum = 0.0_f64;

    for record in records {
        sample_size += 1;
        if record.is_displaced() {
            counts.displaced += 1;
        }
        if !record.brand_mentioned {
            continue;
        }

        counts.mentioned += 1;
        recommendation_sum += record.recommendation_strength;

        if let Some(rank) = record.usable_rank() {
            counts.ranked += 1;
            rank_score_sum += 1.0 / f64::from(rank);
        }

        match record.sentiment {
            Sentiment::Positive => counts.positive += 1,
            Sentiment::Neutral => counts.neutral += 1,
            Sentiment::Negative => counts.negative += 1,
        }

        if record.context_type == ContextType::Criticism {
            counts.criticism += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = |sum: f64, n: usize| if n == 0 { 0.0 } else { sum / n as f64 };

    AggregateGroup {
        key,
        sample_size,
        mention_rate: ratio(counts.mentioned, sample_size),
        avg_rank_score: mean(rank_score_sum, counts.ranked),
        positive_sentiment_ratio: ratio(counts.positive, counts.mentioned),
        recommendation_strength_avg: mean(recommendation_sum, counts.mentioned),
        counts,
    }
}
