//! TOML-based application configuration.
//!
//! Stores the session preferences the UI surfaces:
//! - Countdown timer toggle and duration
//! - Spoken-cue toggle and preferred language
//!
//! Configuration is stored at `~/.config/repwell/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;

/// Countdown timer preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds each repetition is held.
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_secs: default_duration_secs(),
        }
    }
}

/// Spoken-cue preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Preferred voice language prefix, e.g. "en".
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: default_language(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/repwell/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
}

impl Config {
    /// Load from the default location; missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/repwell/config.toml"),
            message: e.to_string(),
        })?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::SaveFailed {
            path: PathBuf::from("~/.config/repwell/config.toml"),
            message: e.to_string(),
        })?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }
}

fn default_true() -> bool {
    true
}

fn default_duration_secs() -> u32 {
    crate::timer::DEFAULT_DURATION_SECS
}

fn default_language() -> String {
    "en".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert!(config.timer.enabled);
        assert_eq!(config.timer.duration_secs, 15);
        assert!(config.voice.enabled);
        assert_eq!(config.voice.language, "en");
    }

    #[test]
    fn round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.timer.duration_secs = 20;
        config.voice.enabled = false;
        config.save_to(&path).unwrap();

        let back = Config::load_from(&path).unwrap();
        assert_eq!(back.timer.duration_secs, 20);
        assert!(!back.voice.enabled);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.timer.duration_secs, 15);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timer]\nduration_secs = 30\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.timer.duration_secs, 30);
        assert!(config.timer.enabled);
        assert!(config.voice.enabled);
    }
}
