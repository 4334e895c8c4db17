//! # Configuration Management Module
//!
//! Persistent settings stored in platform-appropriate locations.
//! Handles loading, saving, and providing defaults for configuration options.
//!
//! ## Settings
//! - `detector.threshold`: Per-axis angular-rate threshold for a cycle
//! - `detector.debounce_ms`: Minimum spacing between two cycles
//! - `frequency.window_ms`: Length of one frequency window / timer period
//! - `history.dir`: Directory holding the session history (`history_records.json`)
//!
//! ## Storage Location
//! - macOS: ~/Library/Application Support/swingtrack/config.toml
//! - Linux: ~/.config/swingtrack/config.toml
//! - Windows: %APPDATA%\swingtrack\config.toml

use crate::detector::DetectorConfig;
use crate::error::ConfigError;
use crate::frequency::FrequencyConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "swingtrack";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Overrides the platform data directory when set
    pub dir: Option<PathBuf>,
}

impl HistoryConfig {
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub detector: DetectorConfig,
    pub frequency: FrequencyConfig,
    pub history: HistoryConfig,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    /// Load config from the platform location, creating a default if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::config_path())
    }

    /// Save config to the platform location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::config_path())
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(contents) => {
                let config = toml::from_str(&contents).map_err(ConfigError::ParseFailed)?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, writing defaults", path.display());
                let config = Self::default();
                config.save_to(path)?;
                Ok(config)
            }
            Err(e) => Err(ConfigError::ReadFailed(e)),
        }
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::WriteFailed)?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(ConfigError::SerializeFailed)?;
        fs::write(path, toml_string).map_err(ConfigError::WriteFailed)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.detector.threshold, 0.85);
        assert_eq!(config.detector.debounce_ms, 200);
        assert_eq!(config.frequency.window_ms, 1_000);
        assert!(config.history.dir.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.detector.debounce_ms = 250;

        let toml_str = toml::to_string(&config).expect("Failed to serialize");
        assert!(toml_str.contains("[detector]"));
        assert!(toml_str.contains("debounce_ms = 250"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml_str = r#"
            [detector]
            threshold = 1.2
        "#;

        let config: Config = toml::from_str(toml_str).expect("Failed to deserialize");
        assert_eq!(config.detector.threshold, 1.2);
        assert_eq!(config.detector.debounce_ms, 200);
        assert_eq!(config.frequency.window_ms, 1_000);
    }

    #[test]
    fn test_config_load_creates_default() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).expect("Failed to load config");
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_config_save_and_reload() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.frequency.window_ms = 500;
        config.history.dir = Some(temp_dir.path().join("history"));
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
        assert_eq!(reloaded.history.resolved_dir(), temp_dir.path().join("history"));
    }

    #[test]
    fn test_history_file_lives_in_history_dir() {
        use crate::history::{FileStore, HISTORY_RECORDS_KEY};

        let temp_dir = tempdir().unwrap();
        let toml_str = format!(
            "[history]\ndir = {:?}\n",
            temp_dir.path().join("records").display().to_string()
        );
        let config: Config = toml::from_str(&toml_str).unwrap();

        let store = FileStore::new(config.history.resolved_dir());
        assert_eq!(
            store.path_for(HISTORY_RECORDS_KEY),
            temp_dir.path().join("records").join("history_records.json")
        );
        assert!(Config::default()
            .history
            .resolved_dir()
            .ends_with("swingtrack"));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "detector = 5").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseFailed(_))
        ));
    }
}
