//! Storage settings for repository construction.
//!
//! # Responsibility
//! - Carry externally supplied storage targets and logging settings.
//! - Keep credentials and paths out of code; callers load them from a file.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Externally supplied settings for binding repositories.
///
/// Every target is optional; an application configures only the backends it
/// uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Target file for the JSON backend.
    #[serde(default)]
    pub json_path: Option<PathBuf>,
    /// Target file for the YAML backend.
    #[serde(default)]
    pub yaml_path: Option<PathBuf>,
    /// Database file for the SQLite backend.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    #[serde(default = "default_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_level() -> String {
    crate::logging::default_log_level().to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            json_path: None,
            yaml_path: None,
            db_path: None,
            log_level: default_level(),
            log_dir: None,
        }
    }
}

impl StorageConfig {
    /// Loads settings from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parses settings from a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(ConfigError::Parse)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StorageConfig;
    use std::path::PathBuf;

    #[test]
    fn parses_partial_document_with_defaults() {
        let config = StorageConfig::from_json_str(r#"{"json_path": "clients.json"}"#).unwrap();
        assert_eq!(config.json_path, Some(PathBuf::from("clients.json")));
        assert_eq!(config.yaml_path, None);
        assert_eq!(config.db_path, None);
        assert!(!config.log_level.is_empty());
    }

    #[test]
    fn rejects_malformed_document() {
        let err = StorageConfig::from_json_str("{not json").unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn round_trips_through_json() {
        let config = StorageConfig {
            db_path: Some(PathBuf::from("/var/lib/clientbook/clients.db")),
            log_level: "warn".to_string(),
            ..StorageConfig::default()
        };
        let text = serde_json::to_string(&config).unwrap();
        let decoded = StorageConfig::from_json_str(&text).unwrap();
        assert_eq!(decoded, config);
    }
}
