use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::sidebar::OrphanPolicy;
use crate::utils;
use crate::views::{PREVIEW_MAX_CHARS, TODO_TIME_LIMIT_HOURS};

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Longest accepted todo time box: a hundred years
pub const MAX_TODO_TIME_LIMIT_HOURS: i64 = 24 * 365 * 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_todo_time_limit_hours")]
    pub todo_time_limit_hours: i64,
    #[serde(default = "default_preview_max_chars")]
    pub preview_max_chars: usize,
    #[serde(default)]
    pub orphan_policy: OrphanPolicy,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            todo_time_limit_hours: default_todo_time_limit_hours(),
            preview_max_chars: default_preview_max_chars(),
            orphan_policy: OrphanPolicy::default(),
            log_level: default_log_level(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

// Default value functions
fn default_database_path() -> String {
    Config::default_database_path_for_profile(utils::Profile::Prod)
}

fn default_todo_time_limit_hours() -> i64 {
    TODO_TIME_LIMIT_HOURS
}

fn default_preview_max_chars() -> usize {
    PREVIEW_MAX_CHARS
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

impl Config {
    /// Load configuration from file, or create default if missing
    /// Uses the provided profile to determine config and database paths
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            // Create default config and save it
            let mut config = Config::default();
            config.database_path = Self::default_database_path_for_profile(profile);
            config.save_to_path(&config_path)?;
            Ok(config)
        }
    }

    /// Load configuration from an explicit file path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_path(&mut self, path: &Path) -> Result<(), ConfigError> {
        // Ensure config version is set before saving
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get default database path for a specific profile
    pub fn default_database_path_for_profile(profile: utils::Profile) -> String {
        if let Some(data_dir) = utils::get_data_dir(profile) {
            data_dir.join("daylog.db").to_string_lossy().to_string()
        } else {
            match profile {
                utils::Profile::Dev => "~/.local/share/daylog-dev/daylog.db".to_string(),
                utils::Profile::Prod => "~/.local/share/daylog/daylog.db".to_string(),
            }
        }
    }

    /// Get the expanded database path (with ~ expansion)
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }

    /// The todo time box, falling back to the default when the configured
    /// hours cannot be represented
    pub fn todo_time_limit(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::try_hours(self.todo_time_limit_hours)
            .unwrap_or_else(crate::views::default_todo_limit)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_TODO_TIME_LIMIT_HOURS).contains(&self.todo_time_limit_hours) {
            return Err(ConfigError::InvalidSetting(format!(
                "todo_time_limit_hours must be between 1 and {}, got {}",
                MAX_TODO_TIME_LIMIT_HOURS, self.todo_time_limit_hours
            )));
        }
        if self.preview_max_chars == 0 {
            return Err(ConfigError::InvalidSetting(
                "preview_max_chars must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
