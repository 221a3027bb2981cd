//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the dive-planner.toml
//! file. It selects which table set the planner runs on and how results are
//! printed.

use crate::{TableError, TableSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "dive-planner.toml";

/// Errors raised while writing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("config encoding: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Application configuration loaded from dive-planner.toml
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Table set selection
    pub tables: TablesConfig,
    /// Output options
    pub output: OutputConfig,
}

/// Which table set to plan with
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TablesConfig {
    /// Alternate table file (same schema as the bundled tables).
    /// The bundled PADI imperial tables are used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// How plan results are printed
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// `text` for a readable report, `json` for machine consumption
    pub format: OutputFormat,
    /// Print the no-decompression limit chart before planning
    pub show_table_limits: bool,
}

/// Output rendering mode
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Config {
    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "invalid config file format, using defaults"
                    );
                    Self::default()
                }
            },
            Err(_) => {
                tracing::debug!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Save current configuration to the given path
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        tracing::info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }

    /// Build the configured table set.
    pub fn table_set(&self) -> Result<TableSet, TableError> {
        match &self.tables.path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading tables from file");
                TableSet::load_from_path(path)
            }
            None => TableSet::padi_imperial(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Units;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tables.path, None);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(!config.output.show_table_limits);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config {
            tables: TablesConfig {
                path: Some(PathBuf::from("/etc/dive/metric.toml")),
            },
            output: OutputConfig {
                format: OutputFormat::Json,
                show_table_limits: true,
            },
        };
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Config = toml::from_str("[output]\nformat = \"json\"\n").unwrap();
        assert_eq!(parsed.output.format, OutputFormat::Json);
        assert_eq!(parsed.tables.path, None);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_invalid_file_falls_back() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "output = 12").unwrap();
        assert_eq!(Config::load_from_path(temp_file.path()), Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.output.show_table_limits = true;
        config.save_to_path(temp_file.path()).unwrap();
        assert_eq!(Config::load_from_path(temp_file.path()), config);
    }

    #[test]
    fn test_table_set_defaults_to_bundled_tables() {
        let tables = Config::default().table_set().unwrap();
        assert_eq!(tables.units(), Units::Feet);
    }

    #[test]
    fn test_table_set_from_missing_path() {
        let config = Config {
            tables: TablesConfig {
                path: Some(PathBuf::from("/nonexistent/tables.toml")),
            },
            ..Config::default()
        };
        assert!(matches!(config.table_set(), Err(TableError::Io(_))));
    }
}
