// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration is stored in `config.toml` inside the config directory
//! and covers the relay endpoints, reconnect tuning, and whether a
//! catch-up sync runs at startup. Every field has a default, so a missing
//! file means "talk to the public relay".

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const CONFIG_FILE_NAME: &str = "config.toml";
/// Credential store filename within the config directory.
pub const STORE_FILE_NAME: &str = "credentials.toml";
/// Dedup ledger filename within the config directory.
pub const LEDGER_FILE_NAME: &str = "messages.db";

/// Client configuration stored in `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the relay's REST API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// URL of the relay's streaming push endpoint.
    #[serde(default = "default_push_url")]
    pub push_url: String,
    /// Initial delay for reconnect backoff (milliseconds).
    #[serde(default = "default_reconnect_initial_delay_ms")]
    pub reconnect_initial_delay_ms: u64,
    /// Maximum delay between reconnect attempts (seconds).
    #[serde(default = "default_reconnect_max_delay_secs")]
    pub reconnect_max_delay_secs: u64,
    /// Run one reconciliation cycle at startup to catch messages that
    /// arrived while the client was offline.
    #[serde(default = "default_sync_on_startup")]
    pub sync_on_startup: bool,
}

fn default_api_url() -> String {
    "https://api.pushover.net/1".to_string()
}

fn default_push_url() -> String {
    "wss://client.pushover.net/push".to_string()
}

fn default_reconnect_initial_delay_ms() -> u64 {
    1_000
}

fn default_reconnect_max_delay_secs() -> u64 {
    30
}

fn default_sync_on_startup() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: default_api_url(),
            push_url: default_push_url(),
            reconnect_initial_delay_ms: default_reconnect_initial_delay_ms(),
            reconnect_max_delay_secs: default_reconnect_max_delay_secs(),
            sync_on_startup: default_sync_on_startup(),
        }
    }
}

impl Config {
    /// Loads configuration from the given config directory.
    ///
    /// A missing file yields the defaults.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let content = match fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Config::default());
            }
            Err(e) => return Err(e.into()),
        };
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Saves configuration to the given config directory.
    pub fn save(&self, config_dir: &Path) -> Result<()> {
        fs::create_dir_all(config_dir)?;
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }
}

/// The default config directory (`~/.config/pover` on Linux).
pub fn default_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("pover"))
        .ok_or_else(|| Error::Config("could not determine config directory".to_string()))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
