//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON. Every section
//! defaults sensibly so a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub loader: LoaderConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, returning an error if it cannot be
    /// read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        let c = &self.catalog;
        if c.max_page_size == 0 || c.max_page_size > 100 {
            warnings.push(format!(
                "catalog.max_page_size {} is outside 1..=100; requests above 100 are always rejected",
                c.max_page_size
            ));
        }
        if c.default_page_size == 0 || c.default_page_size > c.max_page_size {
            warnings.push(format!(
                "catalog.default_page_size {} exceeds catalog.max_page_size {}",
                c.default_page_size, c.max_page_size
            ));
        }
        if c.related_default_limit == 0 {
            warnings.push("catalog.related_default_limit is 0; related lists will be empty".into());
        }

        let l = &self.loader;
        if l.max_attempts == 0 {
            warnings.push("loader.max_attempts is 0; at least one attempt is always made".into());
        }
        if l.page_size == 0 || l.page_size > 100 {
            warnings.push(format!("loader.page_size {} is outside 1..=100", l.page_size));
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            db_path: PathBuf::from("/data/vetrina.db"),
        }
    }
}

/// Limits applied by the catalog query endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub related_default_limit: u32,
    pub suggestions_limit: u32,
    pub top_viewed_limit: u32,
    pub latest_default_limit: u32,
    /// Trailing window, in days, for the mixed "latest" list.
    pub latest_window_days: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 100,
            related_default_limit: 25,
            suggestions_limit: 5,
            top_viewed_limit: 10,
            latest_default_limit: 25,
            latest_window_days: 60,
        }
    }
}

/// Incremental list loader tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub debounce_ms: u64,
    pub max_attempts: u32,
    pub base_backoff_ms: u64,
    /// Distance from the bottom of the document that triggers the next page.
    pub scroll_margin_px: u32,
    pub throttle_ms: u64,
    pub page_size: u32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 800,
            max_attempts: 3,
            base_backoff_ms: 500,
            scroll_margin_px: 200,
            throttle_ms: 1000,
            page_size: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_json_is_default() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.catalog.default_page_size, 50);
        assert_eq!(config.catalog.max_page_size, 100);
        assert_eq!(config.loader.debounce_ms, 800);
        assert_eq!(config.loader.max_attempts, 3);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = Config::from_json(r#"{"catalog": {"related_default_limit": 10}}"#).unwrap();
        assert_eq!(config.catalog.related_default_limit, 10);
        assert_eq!(config.catalog.suggestions_limit, 5);
    }

    #[test]
    fn invalid_json_is_validation_error() {
        let err = Config::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(Some(&dir.path().join("missing.json")));
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"server": {{"port": 9999}}}}"#).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 9999);
    }

    #[test]
    fn validate_default_has_no_warnings() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn validate_flags_bad_limits() {
        let mut config = Config::default();
        config.catalog.default_page_size = 500;
        config.loader.max_attempts = 0;
        let warnings = config.validate();
        assert_eq!(warnings.len(), 2);
    }
}
