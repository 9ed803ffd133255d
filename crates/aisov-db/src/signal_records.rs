//! Database operations for the append-only `signal_records` table.

use aisov_core::{Period, SignalRecord};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `signal_records` table.
///
/// Enum columns are stored as text and parsed on conversion to
/// [`SignalRecord`], so a row written outside this crate is still validated.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SignalRecordRow {
    pub id: i64,
    pub response_id: Uuid,
    pub brand_name: String,
    pub llm_name: String,
    pub intent_category: String,
    pub observed_at: DateTime<Utc>,
    pub brand_mentioned: bool,
    pub rank_position: Option<i32>,
    pub sentiment: String,
    pub context_type: String,
    pub recommendation_strength: f64,
    pub competitor_mentioned: bool,
    pub competitors: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SignalRecordRow> for SignalRecord {
    type Error = DbError;

    fn try_from(row: SignalRecordRow) -> Result<Self, Self::Error> {
        let invalid = |e: aisov_core::SignalError| DbError::InvalidRow(format!("signal {}: {e}", row.id));

        let rank_position = row
            .rank_position
            .map(u32::try_from)
            .transpose()
            .map_err(|_| DbError::InvalidRow(format!("signal {}: negative rank_position", row.id)))?;

        let record = SignalRecord {
            response_id: row.response_id,
            brand_name: row.brand_name.clone(),
            llm_name: row.llm_name.parse().map_err(invalid)?,
            intent_category: row.intent_category.parse().map_err(invalid)?,
            timestamp: row.observed_at,
            brand_mentioned: row.brand_mentioned,
            rank_position,
            sentiment: row.sentiment.parse().map_err(invalid)?,
            context_type: row.context_type.parse().map_err(invalid)?,
            recommendation_strength: row.recommendation_strength,
            competitor_mentioned: row.competitor_mentioned,
            competitors: row.competitors.clone(),
        };
        record.validate().map_err(invalid)?;
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Append one signal record.
///
/// Returns `true` if the row was inserted, `false` if a record with the same
/// `response_id` already exists. Existing rows are never modified.
///
/// # Errors
///
/// Returns [`DbError::InvalidRow`] if the record fails validation, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn insert_signal_record(pool: &PgPool, record: &SignalRecord) -> Result<bool, DbError> {
    record
        .validate()
        .map_err(|e| DbError::InvalidRow(e.to_string()))?;

    let rank_position = record
        .rank_position
        .map(i32::try_from)
        .transpose()
        .map_err(|_| DbError::InvalidRow(format!("signal {}: rank_position too large", record.response_id)))?;

    let result = sqlx::query(
        "INSERT INTO signal_records \
             (response_id, brand_name, llm_name, intent_category, observed_at, \
              brand_mentioned, rank_position, sentiment, context_type, \
              recommendation_strength, competitor_mentioned, competitors) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
         ON CONFLICT (response_id) DO NOTHING",
    )
    .bind(record.response_id)
    .bind(&record.brand_name)
    .bind(record.llm_name.as_str())
    .bind(record.intent_category.as_str())
    .bind(record.timestamp)
    .bind(record.brand_mentioned)
    .bind(rank_position)
    .bind(record.sentiment.as_str())
    .bind(record.context_type.as_str())
    .bind(record.recommendation_strength)
    .bind(record.competitor_mentioned)
    .bind(&record.competitors)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// List all signal records observed within `period` (UTC dates, inclusive).
///
/// Results are ordered by `observed_at` then `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::InvalidRow`]
/// if a stored row does not form a valid [`SignalRecord`].
pub async fn list_signal_records(pool: &PgPool, period: Period) -> Result<Vec<SignalRecord>, DbError> {
    let rows = sqlx::query_as::<_, SignalRecordRow>(
        "SELECT id, response_id, brand_name, llm_name, intent_category, observed_at, \
                brand_mentioned, rank_position, sentiment, context_type, \
                recommendation_strength, competitor_mentioned, competitors, created_at \
         FROM signal_records \
         WHERE (observed_at AT TIME ZONE 'UTC')::date BETWEEN $1 AND $2 \
         ORDER BY observed_at, id",
    )
    .bind(period.start())
    .bind(period.end())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(SignalRecord::try_from).collect()
}
