//! Bridge configuration (`bridge.json`).
//!
//! Every field has a default, so an empty object or a partial file is valid.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::channel::framing::DEFAULT_MAX_FRAME_BYTES;
use crate::error::ConfigError;

pub const CONFIG_FILE: &str = "bridge.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BridgeConfig {
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            max_frame_bytes: default_max_frame_bytes(),
            log_filter: default_log_filter(),
        }
    }
}

impl BridgeConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Like [`BridgeConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_max_frame_bytes() -> usize {
    DEFAULT_MAX_FRAME_BYTES
}

fn default_log_filter() -> String {
    "plugin_channel=info".to_string()
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
