//! TOML-based application configuration.
//!
//! Stored at `~/.config/tabfocus/config.toml`. Every field has a default so
//! a missing or partial file never blocks startup.

use std::path::PathBuf;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::storage::data_dir;

/// Timer phase lengths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Work phase length in seconds.
    #[serde(default = "default_work_duration")]
    pub work_duration_secs: u64,
    /// Break phase length in seconds.
    #[serde(default = "default_break_duration")]
    pub break_duration_secs: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_duration_secs: default_work_duration(),
            break_duration_secs: default_break_duration(),
        }
    }
}

/// Enforcement tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforcerConfig {
    /// Pause between a forced navigation and its warning dialog, letting
    /// the environment's tab activation settle.
    #[serde(default = "default_warning_delay_ms")]
    pub warning_delay_ms: u64,
}

impl Default for EnforcerConfig {
    fn default() -> Self {
        Self {
            warning_delay_ms: default_warning_delay_ms(),
        }
    }
}

impl EnforcerConfig {
    pub fn warning_delay(&self) -> Duration {
        Duration::from_millis(self.warning_delay_ms)
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub enforcer: EnforcerConfig,
}

impl Config {
    /// Load from disk, falling back to defaults on any failure.
    pub fn load_or_default() -> Self {
        let path = match Self::path() {
            Ok(path) => path,
            Err(err) => {
                warn!("config directory unavailable ({err}), using defaults");
                return Self::default();
            }
        };
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str(&text) {
                Ok(config) => config,
                Err(err) => {
                    warn!("failed to parse {}: {err}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(err) => {
                warn!("failed to read {}: {err}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let text = toml::to_string_pretty(self)
            .map_err(|err| ConfigError::ParseFailed(err.to_string()))?;
        std::fs::write(&path, text).map_err(|err| ConfigError::SaveFailed {
            path,
            message: err.to_string(),
        })
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|err| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/tabfocus"),
            message: err.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }
}

fn default_work_duration() -> u64 {
    25 * 60
}

fn default_break_duration() -> u64 {
    5 * 60
}

fn default_warning_delay_ms() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_cycle() {
        let config = Config::default();
        assert_eq!(config.timer.work_duration_secs, 25 * 60);
        assert_eq!(config.timer.break_duration_secs, 5 * 60);
        assert_eq!(config.enforcer.warning_delay_ms, 300);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str("[timer]\nwork_duration_secs = 10\n").unwrap();
        assert_eq!(config.timer.work_duration_secs, 10);
        assert_eq!(config.timer.break_duration_secs, 5 * 60);
        assert_eq!(config.enforcer.warning_delay_ms, 300);
    }
}
