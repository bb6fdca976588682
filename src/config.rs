//! Configuration management for Shelfscout.
//!
//! Handles loading, saving, and validating configuration from
//! platform-specific config directories.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application name used for config directory.
const APP_NAME: &str = "shelfscout";

/// Default config filename.
const CONFIG_FILENAME: &str = "config.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page loading, retry and throttling settings.
    pub loader: LoaderConfig,

    /// Browser session settings.
    pub browser: BrowserConfig,

    /// Batch run settings.
    pub batch: BatchConfig,

    /// Reading-list reader settings.
    pub shelf: ShelfConfig,
}

/// Retry and throttling behavior for page loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// How long to wait for the awaited element on each attempt.
    pub timeout_sec: u64,

    /// Retries after the first attempt before giving up.
    pub max_retries: u32,

    /// Backoff after the Nth timeout is `N * backoff_step_sec`.
    pub backoff_step_sec: u64,

    /// Lower bound of the pause after a successful load.
    pub jitter_min_sec: f64,

    /// Upper bound (exclusive) of the pause after a successful load.
    pub jitter_max_sec: f64,

    /// Log every URL that gets loaded.
    pub debug: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_sec: 10,
            max_retries: 5,
            backoff_step_sec: 15,
            jitter_min_sec: 1.0,
            jitter_max_sec: 3.0,
            debug: false,
        }
    }
}

/// Browser session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run without a visible window.
    pub headless: bool,

    /// Chrome/Chromium executable. If not set, one is searched for on PATH.
    pub executable: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
        }
    }
}

/// Batch run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Report from a previous run, scanned to decide how many books to skip.
    pub progress_log: PathBuf,

    /// Emit a progress line every N books.
    pub heartbeat_every: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            progress_log: PathBuf::from("libby.out"),
            heartbeat_every: 10,
        }
    }
}

/// Reading-list reader configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelfConfig {
    /// Delay between shelf page requests in seconds.
    pub delay_between_requests_sec: f64,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            delay_between_requests_sec: 1.0,
        }
    }
}

impl Config {
    /// Returns the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the full path to the config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILENAME))
    }

    /// Loads configuration from the default location.
    ///
    /// If the config file doesn't exist, creates a default one.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.loader.timeout_sec == 0 {
            return Err(ConfigError::InvalidValue {
                key: "loader.timeout_sec".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        let (min, max) = (self.loader.jitter_min_sec, self.loader.jitter_max_sec);
        if !(min >= 0.0 && max >= min) {
            return Err(ConfigError::InvalidValue {
                key: "loader.jitter_max_sec".to_string(),
                message: format!("jitter range [{min}, {max}) is not valid"),
            });
        }

        if self.batch.heartbeat_every == 0 {
            return Err(ConfigError::InvalidValue {
                key: "batch.heartbeat_every".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        if self.shelf.delay_between_requests_sec < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "shelf.delay_between_requests_sec".to_string(),
                message: "must not be negative".to_string(),
            });
        }

        Ok(())
    }
}
