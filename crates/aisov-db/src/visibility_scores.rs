//! Database operations for the `visibility_scores` table.

use aisov_scoring::{BatchOutcome, ScoredGroup};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::*;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `visibility_scores` table.
///
/// `llm_name` / `intent_category` are `None` for scores computed across all
/// LLMs / intents.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VisibilityScoreRow {
    pub id: i64,
    pub brand_name: String,
    pub llm_name: Option<String>,
    pub intent_category: Option<String>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub mention_rate: Decimal,
    pub avg_rank_score: Decimal,
    pub positive_sentiment_ratio: Decimal,
    pub recommendation_strength_avg: Decimal,
    pub aisov_score: Decimal,
    pub sample_size: i32,
    pub computed_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str = "id, brand_name, llm_name, intent_category, period_start, period_end, \
     mention_rate, avg_rank_score, positive_sentiment_ratio, recommendation_strength_avg, \
     aisov_score, sample_size, computed_at";

/// Convert a unit-range score to `NUMERIC(6,4)`.
fn to_numeric(field: &str, value: f64) -> Result<Decimal, DbError> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(4))
        .ok_or_else(|| DbError::InvalidRow(format!("{field} = {value} is not representable")))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Persist every scored group in `outcome` in one transaction.
///
/// Groups without an exact brand are skipped. Failed groups are not stored.
/// Returns the number of rows inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; nothing is committed then.
pub async fn insert_visibility_scores(
    pool: &PgPool,
    outcome: &BatchOutcome,
    computed_at: DateTime<Utc>,
) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0_usize;

    for scored in &outcome.scored {
        if insert_one(&mut tx, scored, computed_at).await? {
            inserted += 1;
        }
    }

    tx.commit().await?;
    Ok(inserted)
}

async fn insert_one(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    scored: &ScoredGroup,
    computed_at: DateTime<Utc>,
) -> Result<bool, DbError> {
    let group = &scored.group;
    let Some(brand) = group.key.brand.exact() else {
        return Ok(false);
    };
    let sample_size = i32::try_from(group.sample_size)
        .map_err(|_| DbError::InvalidRow(format!("sample_size {} too large", group.sample_size)))?;

    sqlx::query(
        "INSERT INTO visibility_scores \
             (brand_name, llm_name, intent_category, period_start, period_end, \
              mention_rate, avg_rank_score, positive_sentiment_ratio, \
              recommendation_strength_avg, aisov_score, sample_size, computed_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(brand)
    .bind(group.key.llm.exact().map(|l| l.as_str()))
    .bind(group.key.intent.exact().map(|i| i.as_str()))
    .bind(group.key.period.start())
    .bind(group.key.period.end())
    .bind(to_numeric("mention_rate", group.mention_rate)?)
    .bind(to_numeric("avg_rank_score", group.avg_rank_score)?)
    .bind(to_numeric("positive_sentiment_ratio", group.positive_sentiment_ratio)?)
    .bind(to_numeric("recommendation_strength_avg", group.recommendation_strength_avg)?)
    .bind(to_numeric("aisov_score", scored.aisov_score)?)
    .bind(sample_size)
    .bind(computed_at)
    .execute(&mut **tx)
    .await?;

    Ok(true)
}

/// Latest overall (all-LLM, all-intent) score per brand.
///
/// Ordered by `aisov_score DESC`, then `sample_size DESC`, then brand name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_latest_overall_scores(pool: &PgPool) -> Result<Vec<VisibilityScoreRow>, DbError> {
    let sql = format!(
        "SELECT * FROM ( \
             SELECT DISTINCT ON (brand_name) {SELECT_COLUMNS} \
             FROM visibility_scores \
             WHERE llm_name IS NULL AND intent_category IS NULL \
             ORDER BY brand_name, computed_at DESC, id DESC \
         ) latest \
         ORDER BY aisov_score DESC, sample_size DESC, brand_name"
    );
    let rows = sqlx::query_as::<_, VisibilityScoreRow>(&sql)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Historical overall scores for one brand, most recent period first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_score_history(
    pool: &PgPool,
    brand_name: &str,
    limit: i64,
) -> Result<Vec<VisibilityScoreRow>, DbError> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} \
         FROM visibility_scores \
         WHERE brand_name = $1 AND llm_name IS NULL AND intent_category IS NULL \
         ORDER BY period_start DESC, computed_at DESC, id DESC \
         LIMIT $2"
    );
    let rows = sqlx::query_as::<_, VisibilityScoreRow>(&sql)
        .bind(brand_name)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_numeric_rounds_to_four_places() {
        let d = to_numeric("aisov_score", 0.608_333_33).unwrap();
        assert_eq!(d.to_string(), "0.6083");
    }

    #[test]
    fn to_numeric_rejects_nan() {
        assert!(matches!(
            to_numeric("aisov_score", f64::NAN),
            Err(DbError::InvalidRow(_))
        ));
    }
}
