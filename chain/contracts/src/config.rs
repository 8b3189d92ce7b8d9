//! Custody configuration
//!
//! Loaded from JSON; every field has a default so an empty object is a
//! valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::ConfigError;

/// Decimals of the chain-native currency (wei per ether).
pub const DEFAULT_NATIVE_DECIMALS: u32 = 18;

/// Configuration for a custody vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CustodyConfig {
    /// Allow ownership to be handed to the zero address, permanently
    /// locking every privileged operation.
    pub allow_zero_owner: bool,
    /// Keep at most this many records in the event log; oldest dropped first.
    pub event_log_limit: Option<usize>,
    /// Decimals used when logging native amounts in whole units.
    pub native_decimals: u32,
}

impl Default for CustodyConfig {
    fn default() -> Self {
        Self {
            allow_zero_owner: false,
            event_log_limit: None,
            native_decimals: DEFAULT_NATIVE_DECIMALS,
        }
    }
}

impl CustodyConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: CustodyConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_log_limit == Some(0) {
            return Err(ConfigError::Invalid {
                reason: "event_log_limit must be at least 1".to_string(),
            });
        }
        if self.native_decimals > types::numeric::MAX_DECIMALS {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "native_decimals {} exceeds {}",
                    self.native_decimals,
                    types::numeric::MAX_DECIMALS
                ),
            });
        }
        Ok(())
    }
}
