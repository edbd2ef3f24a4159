//! Backend endpoint configuration.
//!
//! Configuration priority: ~/.config/prepcall/config.toml > environment
//! variables > built-in default.

use prepcall_core::{PrepcallError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the backend base URL.
pub const API_BASE_URL_ENV: &str = "PREPCALL_API_BASE_URL";

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// On-disk configuration file shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    backend: BackendSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct BackendSection {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
}

/// Connection settings for the remote HTTP backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    /// Base URL without a trailing slash, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl BackendConfig {
    /// Creates a config with the given base URL and the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Loads configuration.
    ///
    /// Priority:
    /// 1. `~/.config/prepcall/config.toml`
    /// 2. `PREPCALL_API_BASE_URL` environment variable
    /// 3. `http://localhost:8000`
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed. A missing file is not an error.
    pub fn load() -> Result<Self> {
        if let Some(path) = default_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }
        Ok(Self::from_env())
    }

    /// Loads configuration from a specific TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let parsed: ConfigFile = toml::from_str(&raw)?;

        let mut config = Self::from_env();
        if let Some(base_url) = parsed.backend.base_url {
            if base_url.trim().is_empty() {
                return Err(PrepcallError::config(format!(
                    "backend.base_url is empty in {}",
                    path.display()
                )));
            }
            config.base_url = normalize_base_url(base_url);
        }
        if let Some(secs) = parsed.backend.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Builds configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        let base_url = env::var(API_BASE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url: normalize_base_url(base_url),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("prepcall").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = BackendConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_from_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[backend]\nbase_url = \"https://api.example.com/\"\nrequest_timeout_secs = 5"
        )
        .unwrap();

        let config = BackendConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_file_rejects_empty_base_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[backend]\nbase_url = \"\"").unwrap();

        let err = BackendConfig::from_file(file.path()).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_new_strips_trailing_slash() {
        let config = BackendConfig::new("http://host:9000/");
        assert_eq!(config.base_url, "http://host:9000");
    }
}
