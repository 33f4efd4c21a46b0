use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{Result, WeatherError};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

pub const API_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";
pub const BASE_URL_ENV: &str = "OPENWEATHERMAP_BASE_URL";
pub const TIMEOUT_ENV: &str = "OPENWEATHERMAP_TIMEOUT_SECS";

/// Settings the processor is built from.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// base_url = "https://api.openweathermap.org/data/2.5/weather"
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Request timeout handed to the HTTP client. `None` leaves the client default.
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl Config {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Load config from the platform config file, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Load config from `path`, or return the default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| WeatherError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| WeatherError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save config to the platform config file.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| WeatherError::ConfigWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let toml = toml::to_string_pretty(self)?;

        fs::write(path, toml).map_err(|source| WeatherError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli").ok_or_else(|| {
            WeatherError::Configuration("Could not determine platform config directory".into())
        })?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay values found through `lookup` (normally the process environment).
    /// Empty values are ignored, an unparsable timeout is ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(url) = non_empty(BASE_URL_ENV) {
            self.base_url = url;
        }
        if let Some(raw) = non_empty(TIMEOUT_ENV) {
            match raw.trim().parse() {
                Ok(secs) => self.timeout_secs = Some(secs),
                Err(_) => tracing::warn!("Ignoring invalid {TIMEOUT_ENV} value: {raw}"),
            }
        }
    }

    /// Returns the API key, if present and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_points_at_openweather_without_key() {
        let cfg = Config::default();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert!(cfg.api_key().is_none());
        assert!(cfg.timeout_secs.is_none());
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cfg = Config::with_api_key("   ");
        assert!(cfg.api_key().is_none());
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut cfg = Config::with_api_key("FROM_FILE");
        let env: HashMap<&str, &str> = [
            (API_KEY_ENV, "FROM_ENV"),
            (BASE_URL_ENV, "http://localhost:9999/weather"),
            (TIMEOUT_ENV, "7"),
        ]
        .into_iter()
        .collect();

        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.api_key(), Some("FROM_ENV"));
        assert_eq!(cfg.base_url, "http://localhost:9999/weather");
        assert_eq!(cfg.timeout_secs, Some(7));
    }

    #[test]
    fn empty_or_invalid_overrides_are_ignored() {
        let mut cfg = Config::with_api_key("FROM_FILE");
        let env: HashMap<&str, &str> = [(API_KEY_ENV, ""), (TIMEOUT_ENV, "soon")]
            .into_iter()
            .collect();

        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.api_key(), Some("FROM_FILE"));
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert!(cfg.timeout_secs.is_none());
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("SECRET".into());
        cfg.timeout_secs = Some(5);
        cfg.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = \"ONLY_KEY\"\n").expect("write");

        let cfg = Config::load_from(&path).expect("load");
        assert_eq!(cfg.api_key(), Some("ONLY_KEY"));
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = [not toml").expect("write");

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
