//! AISOV component weights.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Allowed deviation of the weight sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WeightError {
    #[error("weight '{name}' is {value}; weights must be finite and non-negative")]
    Negative { name: &'static str, value: f64 },

    #[error("weights sum to {sum}; expected 1.0 (tolerance {WEIGHT_SUM_TOLERANCE})")]
    BadSum { sum: f64 },
}

/// Weights of the four AISOV components.
///
/// Passed into the scorer by value; there is no process-wide weight set, so
/// two scorers with different weights can run side by side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub mention: f64,
    pub rank: f64,
    pub sentiment: f64,
    pub recommendation: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            mention: 0.30,
            rank: 0.25,
            sentiment: 0.25,
            recommendation: 0.20,
        }
    }
}

impl ScoringWeights {
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.mention + self.rank + self.sentiment + self.recommendation
    }

    fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("mention", self.mention),
            ("rank", self.rank),
            ("sentiment", self.sentiment),
            ("recommendation", self.recommendation),
        ]
    }

    /// Check that every weight is non-negative and the set sums to 1.0.
    ///
    /// Weight sets are never normalized: an unnormalized set is reported.
    ///
    /// # Errors
    ///
    /// Returns [`WeightError`] describing the first violation.
    pub fn validate(&self) -> Result<(), WeightError> {
        for (name, value) in self.named() {
            if !value.is_finite() || value < 0.0 {
                return Err(WeightError::Negative { name, value });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightError::BadSum { sum });
        }
        Ok(())
    }
}
