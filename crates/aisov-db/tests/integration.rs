//! Offline unit tests for aisov-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::path::PathBuf;

use aisov_core::{AppConfig, LlmName, ScoringWeights, SignalRecord};
use aisov_db::{DbError, PoolConfig, SignalRecordRow, VisibilityScoreRow};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

fn signal_row() -> SignalRecordRow {
    SignalRecordRow {
        id: 7,
        response_id: Uuid::nil(),
        brand_name: "HubSpot".to_string(),
        llm_name: "gemini".to_string(),
        intent_category: "buying_intent".to_string(),
        observed_at: Utc::now(),
        brand_mentioned: true,
        rank_position: Some(3),
        sentiment: "negative".to_string(),
        context_type: "criticism".to_string(),
        recommendation_strength: 0.1,
        competitor_mentioned: false,
        competitors: vec![],
        created_at: Utc::now(),
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: Some("postgres://example".to_string()),
        log_level: "info".to_string(),
        brands_path: PathBuf::from("./config/brands.yaml"),
        weights: ScoringWeights::default(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn signal_row_converts_to_record() {
    let record = SignalRecord::try_from(signal_row()).expect("valid row");
    assert_eq!(record.llm_name, LlmName::Gemini);
    assert_eq!(record.rank_position, Some(3));
    assert_eq!(record.brand_name, "HubSpot");
}

#[test]
fn signal_row_with_unknown_llm_is_invalid() {
    let mut row = signal_row();
    row.llm_name = "bard".to_string();
    let err = SignalRecord::try_from(row).unwrap_err();
    assert!(matches!(err, DbError::InvalidRow(ref m) if m.contains("bard")), "got: {err:?}");
}

#[test]
fn signal_row_with_negative_rank_is_invalid() {
    let mut row = signal_row();
    row.rank_position = Some(-1);
    assert!(matches!(
        SignalRecord::try_from(row),
        Err(DbError::InvalidRow(_))
    ));
}

#[test]
fn signal_row_with_rank_but_no_mention_is_invalid() {
    let mut row = signal_row();
    row.brand_mentioned = false;
    assert!(SignalRecord::try_from(row).is_err());
}

/// Compile-time smoke test: confirm that [`VisibilityScoreRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn visibility_score_row_has_expected_fields() {
    let row = VisibilityScoreRow {
        id: 1_i64,
        brand_name: "HubSpot".to_string(),
        llm_name: None,
        intent_category: Some("comparison".to_string()),
        period_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        period_end: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        mention_rate: Decimal::new(6000, 4),
        avg_rank_score: Decimal::new(5667, 4),
        positive_sentiment_ratio: Decimal::new(6667, 4),
        recommendation_strength_avg: Decimal::new(6000, 4),
        aisov_score: Decimal::new(6083, 4),
        sample_size: 10_i32,
        computed_at: Utc::now(),
    };

    assert!(row.llm_name.is_none());
    assert_eq!(row.aisov_score.to_string(), "0.6083");
    assert_eq!(row.sample_size, 10);
}
