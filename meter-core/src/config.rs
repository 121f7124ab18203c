//! Configuration for the meter

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Meter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON file holding the event list
    pub data_file: PathBuf,

    /// Default number of entries in the leaderboard
    pub leaderboard_limit: usize,

    /// Reject events with an empty reason
    pub require_reason: bool,

    /// Re-check the ceiling when an edit raises a severity
    pub enforce_ceiling_on_update: bool,

    /// Indent the JSON file
    pub pretty_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("heartbreak_data.json"),
            leaderboard_limit: 5,
            require_reason: true,
            enforce_ceiling_on_update: false,
            pretty_json: true,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Apply `HEARTBREAK_*` environment variables on top of this config
    pub fn with_env_overrides(mut self) -> crate::Result<Self> {
        if let Ok(path) = std::env::var("HEARTBREAK_DATA_FILE") {
            self.data_file = PathBuf::from(path);
        }

        if let Ok(limit) = std::env::var("HEARTBREAK_LEADERBOARD_LIMIT") {
            self.leaderboard_limit = limit.parse().map_err(|e| {
                crate::Error::Config(format!("HEARTBREAK_LEADERBOARD_LIMIT: {}", e))
            })?;
        }

        if let Ok(flag) = std::env::var("HEARTBREAK_REQUIRE_REASON") {
            self.require_reason = parse_flag("HEARTBREAK_REQUIRE_REASON", &flag)?;
        }

        if let Ok(flag) = std::env::var("HEARTBREAK_ENFORCE_CEILING_ON_UPDATE") {
            self.enforce_ceiling_on_update =
                parse_flag("HEARTBREAK_ENFORCE_CEILING_ON_UPDATE", &flag)?;
        }

        Ok(self)
    }
}

fn parse_flag(name: &str, value: &str) -> crate::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(crate::Error::Config(format!(
            "{}: expected a boolean, got {:?}",
            name, other
        ))),
    }
}
