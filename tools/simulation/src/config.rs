//! Simulation configuration
//!
//! JSON file with defaults for every field, same shape as the vault's own
//! configuration which it embeds.

use custody::errors::ConfigError;
use custody::CustodyConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a seeded simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// RNG seed; the same seed always yields the same run
    pub seed: u64,
    /// Number of random operations per run
    pub steps: u64,
    /// Number of distinct actor addresses (actor 0 deploys the vault)
    pub actors: usize,
    /// Number of token ledgers
    pub tokens: usize,
    /// Probability that an actor cannot receive native currency
    pub rejecting_ratio: f64,
    /// Probability that a privileged call comes from the current owner
    pub owner_call_ratio: f64,
    /// Upper bound for generated amounts, in base units
    pub max_amount: u64,
    /// Vault configuration
    pub custody: CustodyConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            steps: 10_000,
            actors: 6,
            tokens: 3,
            rejecting_ratio: 0.2,
            owner_call_ratio: 0.7,
            max_amount: 1_000_000,
            custody: CustodyConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| Err(ConfigError::Invalid { reason });

        if self.actors < 2 {
            return invalid(format!("need at least 2 actors, got {}", self.actors));
        }
        if self.tokens == 0 {
            return invalid("need at least 1 token".to_string());
        }
        if !(0.0..=1.0).contains(&self.rejecting_ratio) {
            return invalid(format!("rejecting_ratio {} not in [0, 1]", self.rejecting_ratio));
        }
        if !(0.0..=1.0).contains(&self.owner_call_ratio) {
            return invalid(format!("owner_call_ratio {} not in [0, 1]", self.owner_call_ratio));
        }
        if self.max_amount == 0 {
            return invalid("max_amount must be positive".to_string());
        }
        self.custody.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_nested_custody_config() {
        let config = SimConfig::from_json_str(
            r#"{"seed": 7, "custody": {"event_log_limit": 100}}"#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.custody.event_log_limit, Some(100));
        assert_eq!(config.actors, 6);
    }

    #[test]
    fn test_invalid_ratio() {
        let result = SimConfig::from_json_str(r#"{"rejecting_ratio": 1.5}"#);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_too_few_actors() {
        let result = SimConfig::from_json_str(r#"{"actors": 1}"#);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
