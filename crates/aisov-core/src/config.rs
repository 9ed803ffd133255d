use crate::app_config::AppConfig;
use crate::weights::ScoringWeights;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid or the weight set does not sum to 1.0.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid or the weight set does not sum to 1.0.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_f64 = |var: &str, default: f64| -> Result<f64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.trim().parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let database_url = lookup("DATABASE_URL").ok().filter(|url| !url.is_empty());
    let log_level = or_default("AISOV_LOG_LEVEL", "info");
    let brands_path = PathBuf::from(or_default("AISOV_BRANDS_PATH", "./config/brands.yaml"));

    let defaults = ScoringWeights::default();
    let weights = ScoringWeights {
        mention: parse_f64("AISOV_W_MENTION", defaults.mention)?,
        rank: parse_f64("AISOV_W_RANK", defaults.rank)?,
        sentiment: parse_f64("AISOV_W_SENTIMENT", defaults.sentiment)?,
        recommendation: parse_f64("AISOV_W_RECOMMENDATION", defaults.recommendation)?,
    };
    weights.validate()?;

    let db_max_connections = parse_u32("AISOV_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("AISOV_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("AISOV_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        log_level,
        brands_path,
        weights,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}
