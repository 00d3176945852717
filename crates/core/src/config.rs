//! Configuration management for Keyward.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service instance name, used as a log field
    pub name: String,
    /// Default symmetric key size in bits when a request does not specify one
    pub default_key_bits: u32,
    /// Upper bound on stored keys, shadow versions included
    pub max_stored_keys: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable output
    pub json: bool,
    /// Default filter directive when RUST_LOG is unset
    pub level: String,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            service: ServiceConfig {
                name: "keyward".to_string(),
                default_key_bits: 256,
                max_stored_keys: 4096,
            },
            logging: LoggingConfig {
                json: false,
                level: "info".to_string(),
            },
        }
    }
}
