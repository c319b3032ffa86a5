//! Configuration settings for the anniversary engine.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub projection: ProjectionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            projection: ProjectionConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        // Try standard config locations
        let config_paths = [
            // Current directory
            PathBuf::from("config.toml"),
            PathBuf::from("hearth.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("hearth/config.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".hearth/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.storage.persist && self.storage.data_dir.is_empty() {
            return Err(ConfigError::MissingField("storage.data_dir".to_string()).into());
        }

        if self.projection.max_advance_years == 0 {
            return Err(ConfigError::Invalid("max_advance_years must be > 0".to_string()).into());
        }

        Ok(())
    }

    /// Expand the data directory path.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let expanded = shellexpand::tilde(&self.storage.data_dir);
        Ok(PathBuf::from(expanded.as_ref()))
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the persisted event file
    pub data_dir: String,
    /// Whether to persist events to disk at all
    pub persist: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.hearth/data".to_string(),
            persist: true,
        }
    }
}

/// Occurrence projection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// How many years past the current year a single query may extend a
    /// tenant's horizon
    pub max_advance_years: u32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            max_advance_years: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.storage.persist);
        assert_eq!(config.projection.max_advance_years, 50);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [storage]
            data_dir = "/tmp/hearth"
            persist = true

            [projection]
            max_advance_years = 10
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.storage.data_dir, "/tmp/hearth");
        assert_eq!(config.projection.max_advance_years, 10);
    }

    #[test]
    fn test_validate_missing_data_dir() {
        let toml = r#"
            [storage]
            data_dir = ""
            persist = true
        "#;

        assert!(Config::from_str(toml).is_err());
    }

    #[test]
    fn test_validate_zero_advance() {
        let toml = r#"
            [projection]
            max_advance_years = 0
        "#;

        assert!(Config::from_str(toml).is_err());
    }

    #[test]
    fn test_tilde_expansion() {
        let config = Config::default();
        let dir = config.data_dir().unwrap();
        assert!(!dir.to_string_lossy().starts_with('~'));
    }
}
