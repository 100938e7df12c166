// Configuration for chains declared through a RequestValidator

use crate::{ChainOptions, Result, ValidationError};
use serde::{Deserialize, Serialize};
use std::env;

/// Validation settings, loadable from TOML or the environment.
///
/// ```
/// use gauntlet_validation::ValidationConfig;
///
/// let config = ValidationConfig::from_toml_str("bail = true").unwrap();
/// assert!(config.bail);
/// assert!(!ValidationConfig::from_toml_str("").unwrap().bail);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Default bail policy for new chains
    pub bail: bool,
}

impl ValidationConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| ValidationError::Config(e.to_string()))
    }

    /// Read `GAUNTLET_VALIDATION_BAIL` (`1`/`true`/`0`/`false`).
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = env::var("GAUNTLET_VALIDATION_BAIL") {
            config.bail = parse_flag(&raw).ok_or_else(|| {
                ValidationError::Config(format!("GAUNTLET_VALIDATION_BAIL: not a boolean: {}", raw))
            })?;
        }
        Ok(config)
    }

    pub fn chain_options(&self) -> ChainOptions {
        ChainOptions { bail: self.bail }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
