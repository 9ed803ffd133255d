use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// The focal brand and the competitors the classifier looks for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrandsFile {
    pub primary_brand: String,
    #[serde(default)]
    pub competitors: Vec<String>,
}

impl BrandsFile {
    /// Case-insensitive lookup in the competitor list.
    #[must_use]
    pub fn is_competitor(&self, name: &str) -> bool {
        self.competitors
            .iter()
            .any(|c| c.eq_ignore_ascii_case(name.trim()))
    }

    /// Primary brand followed by all competitors.
    #[must_use]
    pub fn all_brands(&self) -> Vec<&str> {
        std::iter::once(self.primary_brand.as_str())
            .chain(self.competitors.iter().map(String::as_str))
            .collect()
    }
}

/// Load and validate the brands configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_brands(path: &Path) -> Result<BrandsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::BrandsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_brands(&content)
}

/// Parse and validate brands YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_brands(content: &str) -> Result<BrandsFile, ConfigError> {
    let brands_file: BrandsFile =
        serde_yaml::from_str(content).map_err(ConfigError::BrandsFileParse)?;

    validate_brands(&brands_file)?;

    Ok(brands_file)
}

fn validate_brands(brands_file: &BrandsFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for name in brands_file.all_brands() {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "brand name must be non-empty".to_string(),
            ));
        }

        if !seen.insert(name.trim().to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand name: '{name}'"
            )));
        }
    }

    Ok(())
}
