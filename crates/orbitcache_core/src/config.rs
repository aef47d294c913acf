//! Explicit runtime configuration.
//!
//! # Responsibility
//! - Carry catalog, store and fetch settings into each component.
//! - Load optional overrides from a JSON file.
//!
//! # Invariants
//! - A validated config has a non-empty url, group and store path and a
//!   positive fetch timeout.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CATALOG_URL: &str = "https://celestrak.org/NORAD/elements/gp.php";
pub const DEFAULT_STORE_PATH: &str = "tles.sqlite3";
pub const DEFAULT_GROUP: &str = "active";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub catalog_url: String,
    pub store_path: PathBuf,
    /// Catalog group, e.g. `active`, `stations`, `starlink`.
    pub group: String,
    pub fetch_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            group: DEFAULT_GROUP.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// On-disk shape; every field is optional and falls back to the default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    catalog_url: Option<String>,
    store_path: Option<PathBuf>,
    group: Option<String>,
    fetch_timeout_secs: Option<u64>,
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl AppConfig {
    /// Reads a JSON config file and validates the merged result.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parses JSON overrides on top of the defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(text).map_err(ConfigError::Parse)?;
        let defaults = Self::default();
        let config = Self {
            catalog_url: file.catalog_url.unwrap_or(defaults.catalog_url),
            store_path: file.store_path.unwrap_or(defaults.store_path),
            group: file.group.unwrap_or(defaults.group),
            fetch_timeout: file
                .fetch_timeout_secs
                .map_or(defaults.fetch_timeout, Duration::from_secs),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog_url.trim().is_empty() {
            return Err(ConfigError::Invalid("catalog_url cannot be empty".to_string()));
        }
        if self.group.trim().is_empty() {
            return Err(ConfigError::Invalid("group cannot be empty".to_string()));
        }
        if self.store_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store_path cannot be empty".to_string()));
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "fetch_timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, DEFAULT_CATALOG_URL};
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn empty_object_yields_defaults() {
        let config = AppConfig::from_json_str("{}").expect("empty config should load");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.catalog_url, DEFAULT_CATALOG_URL);
    }

    #[test]
    fn fields_override_defaults() {
        let config = AppConfig::from_json_str(
            r#"{"group": "stations", "store_path": "/tmp/cache.db", "fetch_timeout_secs": 5}"#,
        )
        .expect("override config should load");
        assert_eq!(config.group, "stations");
        assert_eq!(config.store_path, PathBuf::from("/tmp/cache.db"));
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
    }

    #[test]
    fn unknown_fields_and_zero_timeout_are_rejected() {
        assert!(matches!(
            AppConfig::from_json_str(r#"{"grup": "typo"}"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            AppConfig::from_json_str(r#"{"fetch_timeout_secs": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
