//! Configuration management for the UTXO matcher.
//!
//! Settings are stored in TOML format. Every field has a default, so a
//! partial (or empty) file is valid; [`MatcherConfig::validate`] rejects
//! values the engine cannot work with.
//!
//! ```toml
//! [selection]
//! page_size = 2000
//! match_timeout_ms = 5000
//! fast_settlement_confirmations = 6
//!
//! [network]
//! network = "bitcoin"
//!
//! [logging]
//! level = "info"
//! ```

use crate::logging::{log_config, log_params, LogConfig, LogLevel};
use anyhow::{anyhow, Result};
use bitcoin::Network;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Largest page a listing request may ask for
pub const MAX_LISTING_PAGE_SIZE: usize = 1000;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MatcherConfig {
    #[serde(default)]
    pub selection: SelectionConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub logging: LogConfig,
}

/// Selection search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Number of outputs fetched per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Wall-clock budget of one search in milliseconds
    #[serde(default = "default_match_timeout_ms")]
    pub match_timeout_ms: u64,

    /// Confirmations an output needs for fast-settlement requests
    #[serde(default = "default_fast_settlement_confirmations")]
    pub fast_settlement_confirmations: u32,

    /// Fixed seed for the random strategy; OS entropy when unset
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl SelectionConfig {
    /// Search budget as a duration
    pub fn match_timeout(&self) -> Duration {
        Duration::from_millis(self.match_timeout_ms)
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            match_timeout_ms: default_match_timeout_ms(),
            fast_settlement_confirmations: default_fast_settlement_confirmations(),
            rng_seed: None,
        }
    }
}

/// Network configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network addresses are parsed for (bitcoin, testnet, signet, regtest)
    #[serde(default = "default_network")]
    pub network: String,
}

impl NetworkConfig {
    /// Parsed network
    pub fn network(&self) -> Result<Network> {
        Network::from_str(&self.network).map_err(|_| anyhow!("Invalid network type: {}", self.network))
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
        }
    }
}

impl MatcherConfig {
    /// Load configuration from file
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| anyhow!("Failed to read config file: {}", e))?;

        let config: MatcherConfig =
            toml::from_str(&content).map_err(|e| anyhow!("Failed to parse config file: {}", e))?;

        log_config(
            LogLevel::Debug,
            "config_loaded",
            Some(log_params(vec![
                ("path", path.to_string()),
                ("network", config.network.network.clone()),
            ])),
        );

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| anyhow!("Failed to serialize config: {}", e))?;

        fs::write(path, content).map_err(|e| anyhow!("Failed to write config file: {}", e))?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.selection.page_size == 0 {
            return Err(anyhow!("Invalid page size: must be greater than 0"));
        }

        if self.selection.match_timeout_ms == 0 {
            return Err(anyhow!("Invalid match timeout: must be greater than 0"));
        }

        if self.selection.fast_settlement_confirmations == 0 {
            return Err(anyhow!("Invalid fast settlement confirmations: must be greater than 0"));
        }

        self.network.network()?;

        Ok(())
    }
}

/// Ensure a configuration file exists at the specified path
/// If it doesn't exist, create it with default values
pub fn ensure_config_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        let default_config = MatcherConfig::default();
        let content = toml::to_string_pretty(&default_config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| anyhow!("Failed to create config directory: {}", e))?;
            }
        }

        fs::write(path, content).map_err(|e| anyhow!("Failed to write default config file: {}", e))?;
    }

    Ok(())
}

// Default value functions

fn default_page_size() -> usize {
    2000
}

fn default_match_timeout_ms() -> u64 {
    5000
}

fn default_fast_settlement_confirmations() -> u32 {
    6
}

fn default_network() -> String {
    "bitcoin".to_string()
}
