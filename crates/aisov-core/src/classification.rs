//! Boundary parsing for classifier model output.
//!
//! The classifier returns a JSON object, sometimes wrapped in markdown code
//! fences. Anything that does not match the expected shape is rejected here
//! instead of being coerced into defaults.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::signals::{ContextType, IntentCategory, LlmName, Sentiment, SignalError, SignalRecord};

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*").expect("valid regex"));

#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("classifier output is empty")]
    Empty,

    #[error("classifier output is not a valid classification object: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("{field} {value} outside [0, 1]")]
    OutOfRange { field: &'static str, value: f64 },

    #[error(transparent)]
    Signal(#[from] SignalError),
}

/// Structured signals extracted by the classifier for one response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Classification {
    pub brand_mentioned: bool,
    pub rank_position: Option<u32>,
    pub sentiment: Sentiment,
    pub context_type: ContextType,
    pub recommendation_strength: f64,
    pub competitor_mentioned: bool,
    #[serde(default)]
    pub competitors_list: Vec<String>,
    /// Classifier self-assessed confidence. Not used for scoring.
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Parse raw classifier output into a [`Classification`].
///
/// # Errors
///
/// Returns [`ClassificationError`] if the output is empty, is not a JSON object
/// with exactly the expected keys, or carries a score outside `[0, 1]`.
pub fn parse_classification(raw: &str) -> Result<Classification, ClassificationError> {
    let cleaned = CODE_FENCE.replace_all(raw, "").replace("```", "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(ClassificationError::Empty);
    }

    let parsed: Classification = serde_json::from_str(cleaned)?;

    check_unit("recommendation_strength", parsed.recommendation_strength)?;
    if let Some(confidence) = parsed.confidence {
        check_unit("confidence", confidence)?;
    }

    Ok(parsed)
}

fn check_unit(field: &'static str, value: f64) -> Result<(), ClassificationError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ClassificationError::OutOfRange { field, value })
    }
}

impl Classification {
    /// Attach response metadata and produce a validated [`SignalRecord`].
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::Signal`] if the combined record is invalid.
    pub fn into_signal_record(
        self,
        response_id: Uuid,
        brand_name: &str,
        llm_name: LlmName,
        intent_category: IntentCategory,
        timestamp: DateTime<Utc>,
    ) -> Result<SignalRecord, ClassificationError> {
        let record = SignalRecord {
            response_id,
            brand_name: brand_name.to_string(),
            llm_name,
            intent_category,
            timestamp,
            brand_mentioned: self.brand_mentioned,
            rank_position: self.rank_position,
            sentiment: self.sentiment,
            context_type: self.context_type,
            recommendation_strength: self.recommendation_strength,
            competitor_mentioned: self.competitor_mentioned,
            competitors: self.competitors_list,
        };
        record.validate()?;
        Ok(record)
    }
}
