use aisov_core::WeightError;
use thiserror::Error;

use crate::types::GroupKey;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("configuration error: {0}")]
    Configuration(#[from] WeightError),

    #[error("insufficient data for {key}: sample size is 0")]
    InsufficientData { key: GroupKey },

    #[error("data integrity error for {key}: {component} = {value} is outside [0, 1]")]
    DataIntegrity {
        key: GroupKey,
        component: &'static str,
        value: f64,
    },
}
