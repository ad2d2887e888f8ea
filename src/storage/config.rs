//! Configuration handling for autosched
//!
//! Configuration is read from the first of:
//! - an explicit path (`--config`)
//! - `autosched.toml` in the current directory or any ancestor
//! - `config.toml` in the global config directory
//!
//! Without any of them the built-in defaults apply (Saturday and Sunday off,
//! no holidays, text output).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{WorkingDayCalendar, WorkingDayConfig};

/// File name searched for in the working directory and its ancestors
pub const PROJECT_CONFIG_FILE: &str = "autosched.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Format used when `--format` is not given
    pub format: OutputFormat,
}

/// Loaded configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub calendar: WorkingDayConfig,
    pub output: OutputConfig,

    /// File the configuration came from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Config {
    /// Loads configuration, preferring `explicit` over discovery
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        Self::discover(&cwd)
    }

    /// Loads the nearest project config above `start`, then the global one
    pub fn discover(start: &Path) -> Result<Self> {
        if let Some(path) = Self::find_project_config(start) {
            return Self::from_file(&path);
        }

        match Self::global_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                debug!("no configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Finds `autosched.toml` in `start` or the closest ancestor holding one
    pub fn find_project_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(PROJECT_CONFIG_FILE))
            .find(|path| path.is_file())
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "autosched", "autosched")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    fn global_config_path() -> Option<PathBuf> {
        Self::global_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Reads and validates a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let mut config = Self::parse(&content)
            .with_context(|| format!("Failed to load config: {}", path.display()))?;
        config.source = Some(path.to_path_buf());

        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parses TOML content and checks the calendar is usable
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.working_calendar()?;
        Ok(config)
    }

    /// Builds the calendar described by the `[calendar]` section
    pub fn working_calendar(&self) -> Result<WorkingDayCalendar, ConfigError> {
        WorkingDayCalendar::new(&self.calendar).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
