//! Domain types and configuration for the AISOV scoring engine.

pub mod app_config;
pub mod brands;
pub mod classification;
pub mod config;
pub mod period;
pub mod signals;
pub mod weights;

use thiserror::Error;

pub use app_config::AppConfig;
pub use brands::{load_brands, parse_brands, BrandsFile};
pub use classification::{parse_classification, Classification, ClassificationError};
pub use config::{load_app_config, load_app_config_from_env};
pub use period::{Granularity, Period, PeriodError};
pub use signals::{ContextType, IntentCategory, LlmName, Sentiment, SignalError, SignalRecord};
pub use weights::{ScoringWeights, WeightError, WEIGHT_SUM_TOLERANCE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("invalid scoring weights: {0}")]
    Weights(#[from] WeightError),

    #[error("failed to read brands file {path}: {source}")]
    BrandsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse brands file: {0}")]
    BrandsFileParse(#[source] serde_yaml::Error),

    #[error("brands validation failed: {0}")]
    Validation(String),
}
