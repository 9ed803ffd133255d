//! AISOV composite scorer.
//!
//! ```text
//! aisov = w_mention        * mention_rate
//!       + w_rank           * avg_rank_score
//!       + w_sentiment      * positive_sentiment_ratio
//!       + w_recommendation * recommendation_strength_avg
//! ```

use aisov_core::ScoringWeights;

use crate::error::ScoringError;
use crate::types::{AggregateGroup, BatchOutcome, GroupError, ScoredGroup};

/// Scores aggregate groups with a validated weight set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scorer {
    weights: ScoringWeights,
}

impl Scorer {
    /// # Errors
    ///
    /// Returns [`ScoringError::Configuration`] if the weights are negative or
    /// do not sum to 1.0.
    pub fn new(weights: ScoringWeights) -> Result<Self, ScoringError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    #[must_use]
    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Score one group. Values are not clamped.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::InsufficientData`] for an empty group and
    /// [`ScoringError::DataIntegrity`] if a component is outside `[0, 1]`.
    pub fn score(&self, group: &AggregateGroup) -> Result<f64, ScoringError> {
        if group.sample_size == 0 {
            return Err(ScoringError::InsufficientData {
                key: group.key.clone(),
            });
        }

        for (component, value) in group.components() {
            if !(0.0..=1.0).contains(&value) {
                return Err(ScoringError::DataIntegrity {
                    key: group.key.clone(),
                    component,
                    value,
                });
            }
        }

        let w = &self.weights;
        Ok(w.mention * group.mention_rate
            + w.rank * group.avg_rank_score
            + w.sentiment * group.positive_sentiment_ratio
            + w.recommendation * group.recommendation_strength_avg)
    }

    /// Score every group independently. A failing group is recorded and
    /// does not affect its siblings.
    #[must_use]
    pub fn score_all(&self, groups: Vec<AggregateGroup>) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for group in groups {
            match self.score(&group) {
                Ok(aisov_score) => outcome.scored.push(ScoredGroup { group, aisov_score }),
                Err(error) => {
                    tracing::warn!(key = %group.key, error = %error, "group could not be scored");
                    outcome.errors.push(GroupError {
                        key: group.key,
                        error,
                    });
                }
            }
        }

        tracing::info!(
            scored = outcome.scored.len(),
            failed = outcome.errors.len(),
            "scored aggregate groups"
        );
        outcome
    }
}

/// Validate `weights`, then score every group.
///
/// # Errors
///
/// Returns [`ScoringError::Configuration`] before any group is scored if the
/// weights are invalid. Per-group failures are returned inside the outcome.
pub fn score_batch(
    weights: ScoringWeights,
    groups: Vec<AggregateGroup>,
) -> Result<BatchOutcome, ScoringError> {
    let scorer = Scorer::new(weights)?;
    Ok(scorer.score_all(groups))
}
