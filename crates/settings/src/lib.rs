//! RewardSync Settings
//!
//! JSON settings files for RewardSync tools. The application defines its own
//! config type and wraps it in `Settings<T>` to load and persist it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

use rewardsync_keystore::default_config_dir_for;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings file not found: {0}")]
    NotFound(String),
    #[error("Failed to read settings: {0}")]
    ReadError(String),
    #[error("Failed to write settings: {0}")]
    WriteError(String),
    #[error("Failed to parse settings {path}: {reason}")]
    ParseError { path: String, reason: String },
    #[error("Failed to create directory: {0}")]
    CreateDirError(String),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// Settings wrapper for any serializable config type.
///
/// ```ignore
/// let settings: Settings<RewardSyncConfig> = Settings::load_or_default("rewardsync", None)?;
/// ```
pub struct Settings<T> {
    pub config: T,
    path: PathBuf,
}

impl<T: Serialize + DeserializeOwned + Default> Settings<T> {
    /// Load settings from an explicit path. The file must exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SettingsError::NotFound(path.display().to_string()));
        }
        let config = read_config(path)?;
        Ok(Self {
            config,
            path: path.to_path_buf(),
        })
    }

    /// Load settings from the default path for a service, writing defaults
    /// there on first use.
    pub fn load_or_default(service: &str, custom_path: Option<&Path>) -> Result<Self> {
        let path = match custom_path {
            Some(p) => p.to_path_buf(),
            None => default_settings_path(service),
        };

        if path.exists() {
            let config = read_config(&path)?;
            Ok(Self { config, path })
        } else {
            debug!("Creating default settings at {}", path.display());
            let settings = Self {
                config: T::default(),
                path,
            };
            settings.save()?;
            Ok(settings)
        }
    }

    /// Save current settings to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| SettingsError::CreateDirError(e.to_string()))?;
            }
        }
        let content = serde_json::to_string_pretty(&self.config)
            .map_err(|e| SettingsError::WriteError(e.to_string()))?;
        fs::write(&self.path, content).map_err(|e| SettingsError::WriteError(e.to_string()))
    }

    /// Get the path where settings are stored.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_config<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!("Loading settings from {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| SettingsError::ReadError(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| SettingsError::ParseError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Get the default settings file path for a service.
pub fn default_settings_path(service: &str) -> PathBuf {
    default_config_dir_for(service).join("settings.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
    struct TestConfig {
        endpoint: String,
        throttle_ms: u64,
    }

    #[test]
    fn test_settings_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings: Settings<TestConfig> =
            Settings::load_or_default("test", Some(&path)).unwrap();
        assert_eq!(settings.config, TestConfig::default());
        assert!(path.exists());

        let settings2: Settings<TestConfig> =
            Settings::load_or_default("test", Some(&path)).unwrap();
        assert_eq!(settings2.config, TestConfig::default());
    }

    #[test]
    fn test_settings_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut settings: Settings<TestConfig> =
            Settings::load_or_default("test", Some(&path)).unwrap();
        settings.config.endpoint = "http://127.0.0.1:8545".to_string();
        settings.config.throttle_ms = 3000;
        settings.save().unwrap();

        let loaded: Settings<TestConfig> = Settings::load(&path).unwrap();
        assert_eq!(loaded.config.endpoint, "http://127.0.0.1:8545");
        assert_eq!(loaded.config.throttle_ms, 3000);
        assert_eq!(loaded.path(), path.as_path());
    }

    #[test]
    fn test_load_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result: Result<Settings<TestConfig>> = Settings::load(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(SettingsError::NotFound(_))));
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let result: Result<Settings<TestConfig>> = Settings::load(&path);
        match result {
            Err(SettingsError::ParseError { path: p, .. }) => assert!(p.contains("broken.json")),
            other => panic!("expected parse error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_default_settings_path() {
        let path = default_settings_path("rewardsync");
        assert!(path.to_string_lossy().ends_with("settings.json"));
    }
}
