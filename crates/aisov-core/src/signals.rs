//! Signal records: one classified LLM response's brand-visibility facts.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("unknown {field} value: '{value}'")]
    UnknownVariant { field: &'static str, value: String },

    #[error("signal {response_id}: {reason}")]
    Invalid { response_id: Uuid, reason: String },

    #[error("malformed signal record: {0}")]
    Json(#[from] serde_json::Error),
}

/// The LLM that produced the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmName {
    #[serde(rename = "chatgpt")]
    ChatGpt,
    Claude,
    Perplexity,
    Gemini,
}

impl LlmName {
    pub const ALL: [LlmName; 4] = [
        LlmName::ChatGpt,
        LlmName::Claude,
        LlmName::Perplexity,
        LlmName::Gemini,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LlmName::ChatGpt => "chatgpt",
            LlmName::Claude => "claude",
            LlmName::Perplexity => "perplexity",
            LlmName::Gemini => "gemini",
        }
    }
}

impl std::fmt::Display for LlmName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmName {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LlmName::ALL
            .into_iter()
            .find(|llm| llm.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SignalError::UnknownVariant {
                field: "llm_name",
                value: s.to_string(),
            })
    }
}

/// Behavioral classification of the prompt that produced the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    GenericDiscovery,
    Comparison,
    BuyingIntent,
    Alternatives,
    SegmentSpecific,
    RiskCriticism,
}

impl IntentCategory {
    pub const ALL: [IntentCategory; 6] = [
        IntentCategory::GenericDiscovery,
        IntentCategory::Comparison,
        IntentCategory::BuyingIntent,
        IntentCategory::Alternatives,
        IntentCategory::SegmentSpecific,
        IntentCategory::RiskCriticism,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IntentCategory::GenericDiscovery => "generic_discovery",
            IntentCategory::Comparison => "comparison",
            IntentCategory::BuyingIntent => "buying_intent",
            IntentCategory::Alternatives => "alternatives",
            IntentCategory::SegmentSpecific => "segment_specific",
            IntentCategory::RiskCriticism => "risk_criticism",
        }
    }
}

impl std::fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentCategory {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntentCategory::ALL
            .into_iter()
            .find(|intent| intent.as_str() == s.trim())
            .ok_or_else(|| SignalError::UnknownVariant {
                field: "intent_category",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            other => Err(SignalError::UnknownVariant {
                field: "sentiment",
                value: other.to_string(),
            }),
        }
    }
}

/// How the brand appears in the response, as judged by the classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextType {
    Recommendation,
    Comparison,
    Criticism,
    #[default]
    Neutral,
    Alternative,
}

impl ContextType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContextType::Recommendation => "recommendation",
            ContextType::Comparison => "comparison",
            ContextType::Criticism => "criticism",
            ContextType::Neutral => "neutral",
            ContextType::Alternative => "alternative",
        }
    }
}

impl std::fmt::Display for ContextType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextType {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "recommendation" => Ok(ContextType::Recommendation),
            "comparison" => Ok(ContextType::Comparison),
            "criticism" => Ok(ContextType::Criticism),
            "neutral" => Ok(ContextType::Neutral),
            "alternative" => Ok(ContextType::Alternative),
            other => Err(SignalError::UnknownVariant {
                field: "context_type",
                value: other.to_string(),
            }),
        }
    }
}

/// One classified LLM response. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignalRecord {
    pub response_id: Uuid,
    pub brand_name: String,
    pub llm_name: LlmName,
    pub intent_category: IntentCategory,
    pub timestamp: DateTime<Utc>,
    pub brand_mentioned: bool,
    /// Ordinal position in a ranked list. `None` or `Some(0)` means not ranked.
    #[serde(default)]
    pub rank_position: Option<u32>,
    /// Only meaningful when `brand_mentioned` is true.
    pub sentiment: Sentiment,
    #[serde(default)]
    pub context_type: ContextType,
    /// In `[0.0, 1.0]`.
    pub recommendation_strength: f64,
    pub competitor_mentioned: bool,
    /// Competitor names found in the response.
    #[serde(default)]
    pub competitors: Vec<String>,
}

impl SignalRecord {
    /// Parse one JSON object and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::Json`] on malformed or unexpected shapes and
    /// [`SignalError::Invalid`] if the record breaks a field constraint.
    pub fn from_json(raw: &str) -> Result<Self, SignalError> {
        let record: SignalRecord = serde_json::from_str(raw)?;
        record.validate()?;
        Ok(record)
    }

    /// Check the field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::Invalid`] naming the first violated constraint.
    pub fn validate(&self) -> Result<(), SignalError> {
        let invalid = |reason: &str| SignalError::Invalid {
            response_id: self.response_id,
            reason: reason.to_string(),
        };

        if self.brand_name.trim().is_empty() {
            return Err(invalid("brand_name must be non-empty"));
        }
        if !self.recommendation_strength.is_finite()
            || !(0.0..=1.0).contains(&self.recommendation_strength)
        {
            return Err(invalid(&format!(
                "recommendation_strength {} outside [0, 1]",
                self.recommendation_strength
            )));
        }
        if !self.brand_mentioned && self.rank_position.is_some_and(|r| r > 0) {
            return Err(invalid("rank_position set on a record without a brand mention"));
        }
        if !self.competitors.is_empty() && !self.competitor_mentioned {
            return Err(invalid("competitors listed but competitor_mentioned is false"));
        }
        Ok(())
    }

    /// Rank usable for the rank score: mentioned and ranked at position 1 or later.
    #[must_use]
    pub fn usable_rank(&self) -> Option<u32> {
        if !self.brand_mentioned {
            return None;
        }
        self.rank_position.filter(|&r| r > 0)
    }

    /// `true` when a competitor was named and the brand was passed over.
    #[must_use]
    pub fn is_displaced(&self) -> bool {
        !self.brand_mentioned && self.competitor_mentioned
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn record() -> SignalRecord {
        SignalRecord {
            response_id: Uuid::nil(),
            brand_name: "HubSpot".to_string(),
            llm_name: LlmName::Claude,
            intent_category: IntentCategory::Comparison,
            timestamp: Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
            brand_mentioned: true,
            rank_position: Some(2),
            sentiment: Sentiment::Positive,
            context_type: ContextType::Recommendation,
            recommendation_strength: 0.8,
            competitor_mentioned: true,
            competitors: vec!["Salesforce".to_string()],
        }
    }

    #[test]
    fn llm_name_parses_case_insensitively() {
        assert_eq!("ChatGPT".parse::<LlmName>().unwrap(), LlmName::ChatGpt);
        assert_eq!("gemini".parse::<LlmName>().unwrap(), LlmName::Gemini);
        assert!("bard".parse::<LlmName>().is_err());
    }

    #[test]
    fn intent_category_round_trips_through_display() {
        for intent in IntentCategory::ALL {
            assert_eq!(intent.to_string().parse::<IntentCategory>().unwrap(), intent);
        }
    }

    #[test]
    fn valid_record_passes_validation() {
        assert!(record().validate().is_ok());
    }

    #[test]
    fn empty_brand_is_rejected() {
        let mut r = record();
        r.brand_name = "   ".to_string();
        let err = r.validate().unwrap_err();
        assert!(err.to_string().contains("brand_name"), "got: {err}");
    }

    #[test]
    fn recommendation_strength_out_of_range_is_rejected() {
        let mut r = record();
        r.recommendation_strength = 1.2;
        assert!(r.validate().is_err());
        r.recommendation_strength = f64::NAN;
        assert!(r.validate().is_err());
    }

    #[test]
    fn rank_without_mention_is_rejected() {
        let mut r = record();
        r.brand_mentioned = false;
        let err = r.validate().unwrap_err();
        assert!(err.to_string().contains("rank_position"), "got: {err}");
    }

    #[test]
    fn zero_rank_without_mention_is_accepted() {
        let mut r = record();
        r.brand_mentioned = false;
        r.rank_position = Some(0);
        assert!(r.validate().is_ok());
        assert_eq!(r.usable_rank(), None);
    }

    #[test]
    fn competitors_require_competitor_flag() {
        let mut r = record();
        r.competitor_mentioned = false;
        assert!(r.validate().is_err());
    }

    #[test]
    fn displaced_means_competitor_named_without_brand() {
        let mut r = record();
        assert!(!r.is_displaced());
        r.brand_mentioned = false;
        r.rank_position = None;
        assert!(r.is_displaced());
    }

    #[test]
    fn from_json_rejects_unknown_fields() {
        let raw = r#"{
            "response_id": "00000000-0000-0000-0000-000000000000",
            "brand_name": "HubSpot",
            "llm_name": "claude",
            "intent_category": "comparison",
            "timestamp": "2026-01-15T12:00:00Z",
            "brand_mentioned": true,
            "sentiment": "positive",
            "recommendation_strength": 0.5,
            "competitor_mentioned": false,
            "mood": "happy"
        }"#;
        let err = SignalRecord::from_json(raw).unwrap_err();
        assert!(matches!(err, SignalError::Json(_)), "got: {err:?}");
    }

    #[test]
    fn from_json_fills_optional_fields() {
        let raw = r#"{
            "response_id": "00000000-0000-0000-0000-000000000000",
            "brand_name": "HubSpot",
            "llm_name": "chatgpt",
            "intent_category": "buying_intent",
            "timestamp": "2026-01-15T12:00:00Z",
            "brand_mentioned": false,
            "sentiment": "neutral",
            "recommendation_strength": 0.0,
            "competitor_mentioned": false
        }"#;
        let r = SignalRecord::from_json(raw).unwrap();
        assert_eq!(r.llm_name, LlmName::ChatGpt);
        assert_eq!(r.rank_position, None);
        assert_eq!(r.context_type, ContextType::Neutral);
        assert!(r.competitors.is_empty());
    }
}
