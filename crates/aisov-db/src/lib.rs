use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Shared with the `sqlx::test` fixtures in tests/live.rs.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &aisov_core::AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error("invalid row: {0}")]
    InvalidRow(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Open a pool against `database_url` sized by `config`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] when no connection can be acquired within the timeout.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Connect using the URL and pool settings from an [`aisov_core::AppConfig`].
///
/// Falls back to the `DATABASE_URL` env var if the config carries no URL.
///
/// # Errors
///
/// Returns [`DbError::MissingDatabaseUrl`] if no URL is available, or
/// [`DbError::Sqlx`] if the connection cannot be established.
pub async fn connect_from_config(config: &aisov_core::AppConfig) -> Result<PgPool, DbError> {
    let database_url = config
        .database_url
        .clone()
        .or_else(|| env::var("DATABASE_URL").ok())
        .ok_or(DbError::MissingDatabaseUrl)?;
    connect_pool(&database_url, PoolConfig::from_app_config(config))
        .await
        .map_err(DbError::from)
}

/// Bring the signal and score tables up to date.
///
/// The return value counts only migrations applied by this call.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] when a migration script fails.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, sqlx::migrate::MigrateError> {
    // Before the first run there is no bookkeeping table to count.
    let applied_before: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    MIGRATOR.run(pool).await?;

    let applied_after: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    let delta = (applied_after - applied_before).max(0);
    Ok(usize::try_from(delta).unwrap_or(0))
}

/// Round-trip a trivial query; backs `aisov db ping`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] when the database is unreachable.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}


pub mod signal_records;
pub mod visibility_scores;

pub use signal_records::{insert_signal_record, list_signal_records, SignalRecordRow};
pub use visibility_scores::{
    insert_visibility_scores, list_latest_overall_scores, list_score_history, VisibilityScoreRow,
};
