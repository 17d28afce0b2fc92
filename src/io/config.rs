//! User settings, stored as JSON in the OS config directory.
//!
//! Every field carries a default, so a partial or hand-edited file stays
//! valid. A few settings can be overridden from the environment:
//! `PLANNER_API_URL`, `PLANNER_API_TOKEN`.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const API_URL_ENV: &str = "PLANNER_API_URL";
pub const API_TOKEN_ENV: &str = "PLANNER_API_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    /// Keep plans in memory instead of talking to the service.
    pub offline: bool,
    pub request_timeout_secs: u64,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

/// Whether settings came from an existing file or were just written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    Read,
    Created,
}

/// Settings plus where they came from. Loading runs before logging is set
/// up, so the caller reports the origin once the subscriber exists.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub path: PathBuf,
    pub origin: ConfigOrigin,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".into(),
            api_token: None,
            offline: false,
            request_timeout_secs: 10,
            log_filter: "info".into(),
        }
    }
}

impl AppConfig {
    /// Directory holding `settings.json`.
    pub fn config_dir() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "day-planner").context("locating config directory")?;
        Ok(dirs.config_dir().to_path_buf())
    }

    /// Load settings from the default location, writing defaults on first run,
    /// then apply environment overrides.
    pub fn load() -> Result<LoadedConfig> {
        let path = Self::config_dir()?.join("settings.json");
        let mut loaded = Self::load_or_init(&path)?;
        loaded.config.apply_overrides(|key| std::env::var(key).ok());
        Ok(loaded)
    }

    pub fn load_or_init(path: &Path) -> Result<LoadedConfig> {
        let (config, origin) = if path.exists() {
            let data = std::fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
            let config: Self = serde_json::from_str(&data).with_context(|| format!("parsing {:?}", path))?;
            (config, ConfigOrigin::Read)
        } else {
            let config = Self::default();
            config.save(path)?;
            (config, ConfigOrigin::Created)
        };
        Ok(LoadedConfig {
            config,
            path: path.to_path_buf(),
            origin,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("serializing settings")?;
        std::fs::write(path, json).with_context(|| format!("writing {:?}", path))
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(token) = lookup(API_TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_token = Some(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn first_run_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let first = AppConfig::load_or_init(&path).unwrap();
        assert_eq!(first.config, AppConfig::default());
        assert_eq!(first.origin, ConfigOrigin::Created);
        assert_eq!(first.path, path);
        assert!(path.exists());

        let second = AppConfig::load_or_init(&path).unwrap();
        assert_eq!(second.origin, ConfigOrigin::Read);
        assert_eq!(second.config, first.config);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "offline": true }"#).unwrap();
        let config = AppConfig::load_or_init(&path).unwrap().config;
        assert!(config.offline);
        assert_eq!(config.api_base_url, "http://localhost:3000/api");
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::load_or_init(&path).is_err());
    }

    #[test]
    fn environment_overrides_url_and_token() {
        let env: HashMap<&str, &str> = [
            (API_URL_ENV, "https://plans.example.com/api"),
            (API_TOKEN_ENV, "tok"),
        ]
        .into_iter()
        .collect();
        let mut config = AppConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.api_base_url, "https://plans.example.com/api");
        assert_eq!(config.api_token.as_deref(), Some("tok"));
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|_| Some("  ".into()));
        assert_eq!(config, AppConfig::default());
    }
}
