use std::path::PathBuf;

use crate::weights::ScoringWeights;

#[derive(Clone)]
pub struct AppConfig {
    /// Only database-backed commands need this.
    pub database_url: Option<String>,
    pub log_level: String,
    pub brands_path: PathBuf,
    pub weights: ScoringWeights,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("log_level", &self.log_level)
            .field("brands_path", &self.brands_path)
            .field("weights", &self.weights)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
