//! Scoring pipeline orchestration.

use aisov_core::{Period, ScoringWeights, SignalRecord};

use crate::aggregator::standard_dimensions;
use crate::error::ScoringError;
use crate::scorer::Scorer;
use crate::types::BatchOutcome;

/// Run aggregation and scoring for one period.
///
/// 1. Validate the weight set. Nothing is aggregated if it is invalid.
/// 2. Aggregate the overall, per-LLM, and per-intent group for each brand.
/// 3. Score each group; failures are collected per group.
///
/// An empty snapshot produces an empty outcome.
///
/// # Errors
///
/// Returns [`ScoringError::Configuration`] if the weights are invalid.
pub fn run_scoring(
    records: &[SignalRecord],
    period: Period,
    weights: ScoringWeights,
) -> Result<BatchOutcome, ScoringError> {
    let scorer = Scorer::new(weights)?;

    let groups = standard_dimensions(records, period);
    if groups.is_empty() {
        tracing::info!(%period, "no signal records in period, nothing to score");
        return Ok(BatchOutcome::default());
    }

    tracing::info!(
        %period,
        records = records.len(),
        groups = groups.len(),
        "scoring aggregate groups"
    );

    Ok(scorer.score_all(groups))
}
