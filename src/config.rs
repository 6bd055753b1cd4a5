//! Process configuration loaded once from a JSON file.
//!
//! Grounded in `original_source`'s `mylog::util::LogConfig`: a lazily
//! initialized singleton that reads a fixed relative config path and
//! reports failures to stderr rather than aborting. Here the same load
//! path is exposed as a plain constructor so it can be dependency-injected
//! in tests, with [`Config::load`] as the process-global convenience
//! wrapper.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::buffer::{DEFAULT_LINEAR_GROWTH, DEFAULT_THRESHOLD};
use crate::error::ConfigError;

/// Default relative path read by [`Config::load`].
pub const DEFAULT_CONFIG_PATH: &str = "log_config.json";

/// The JSON-backed process configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub buffer_size: usize,
    pub threshold: usize,
    pub linear_growth: usize,
    pub flush_log: u8,
    pub backup_addr: String,
    pub backup_port: u16,
    pub thread_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buffer_size: 4096,
            threshold: DEFAULT_THRESHOLD,
            linear_growth: DEFAULT_LINEAR_GROWTH,
            flush_log: 0,
            backup_addr: "127.0.0.1".to_string(),
            backup_port: 9000,
            thread_count: 4,
        }
    }
}

impl Config {
    /// Reads and parses `path` as JSON. Missing keys fall back to
    /// [`Config::default`]'s field values via `#[serde(default)]`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Loads [`DEFAULT_CONFIG_PATH`], reporting to stderr and falling back
    /// to [`Config::default`] on any error. Never fails: matches the
    /// original `LogConfig` constructor's "report and continue" behavior.
    pub fn load() -> Self {
        match Self::from_file(DEFAULT_CONFIG_PATH) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("asynclog: {DEFAULT_CONFIG_PATH}: {e}, using defaults");
                Self::default()
            }
        }
    }
}
