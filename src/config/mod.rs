//! Configuration management for tabdump.
//!
//! An optional TOML file supplies defaults for output and sorting.
//! Command-line flags always take precedence over file values.
//!
//! ```toml
//! [output]
//! format = "html"
//! title = "Session Dump"
//! utc = false
//! time_format = "%a %b %e %H:%M:%S %z %Y"
//!
//! [sort]
//! reverse = false
//! by_index = false
//! collapse_duplicates = false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::datetime::DEFAULT_TIME_FORMAT;
use crate::error::{Result, TabdumpError};
use crate::export::{ExportFormat, DEFAULT_TITLE};

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Output defaults.
    #[serde(default)]
    pub output: OutputConfig,
    /// Sort defaults.
    #[serde(default)]
    pub sort: SortConfig,
}

impl Config {
    /// Load configuration from the default location, if present.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load() -> Result<Self> {
        let Ok(config_path) = default_config_path() else {
            debug!("no configuration directory on this platform");
            return Ok(Self::default());
        };
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            debug!(path = %config_path.display(), "no configuration file");
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TabdumpError::from_io_at(
                path,
                format!("Failed to read config file: {}", path.display()),
                e,
            )
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| TabdumpError::InvalidConfig {
            message: format!("{}: {e}", path.display()),
        })?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// The configured output format.
    pub fn export_format(&self) -> Result<ExportFormat> {
        self.output.format.parse().map_err(|_| TabdumpError::InvalidConfig {
            message: format!("unknown output.format '{}'", self.output.format),
        })
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format name.
    #[serde(default = "default_format")]
    pub format: String,
    /// HTML document title.
    #[serde(default = "default_title")]
    pub title: String,
    /// Render timestamps in UTC.
    #[serde(default)]
    pub utc: bool,
    /// strftime pattern for entry timestamps.
    #[serde(default = "default_time_format")]
    pub time_format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            title: default_title(),
            utc: false,
            time_format: default_time_format(),
        }
    }
}

/// Sort configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    /// Sort descending.
    #[serde(default)]
    pub reverse: bool,
    /// Sort by tab index instead of last access.
    #[serde(default)]
    pub by_index: bool,
    /// Last-write-wins on duplicate sort keys.
    #[serde(default)]
    pub collapse_duplicates: bool,
}

fn default_format() -> String {
    ExportFormat::default().to_string()
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_time_format() -> String {
    DEFAULT_TIME_FORMAT.to_string()
}

/// Get the default configuration path.
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| TabdumpError::Unsupported {
        feature: "config directory discovery".to_string(),
    })?;

    Ok(config_dir.join("tabdump").join("config.toml"))
}
