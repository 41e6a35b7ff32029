//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! backend URL, timeouts, where tokens are kept, and the route table.
//!
//! Configuration is stored at `~/.config/ideabox/config.json`. Every field
//! has a default, so a missing or partial file is fine.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::refresh::{
    RefreshSettings, DEFAULT_LOGIN_PATH, DEFAULT_REFRESH_PATH, DEFAULT_REFRESH_TIMEOUT_SECS,
};
use crate::nav::{Route, RouteTable, LOGIN_PATH};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "ideabox";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "IDEABOX_API_URL";
pub const ENV_TOKEN_STORAGE: &str = "IDEABOX_TOKEN_STORAGE";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStorage {
    #[default]
    File,
    Keyring,
}

impl FromStr for TokenStorage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(TokenStorage::File),
            "keyring" => Ok(TokenStorage::Keyring),
            other => Err(anyhow::anyhow!("Unknown token storage: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub last_email: Option<String>,
    pub request_timeout_secs: u64,
    pub refresh_timeout_secs: u64,
    pub token_storage: TokenStorage,
    pub entry_route: String,
    pub refresh_path: String,
    pub login_path: String,
    /// Replaces the built-in route table when set.
    pub routes: Option<Vec<Route>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            last_email: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            refresh_timeout_secs: DEFAULT_REFRESH_TIMEOUT_SECS,
            token_storage: TokenStorage::default(),
            entry_route: LOGIN_PATH.to_string(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            routes: None,
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Record the last login email in the default config file. Only that
    /// field changes; environment and command-line overrides in effect for
    /// this run are not written back.
    pub fn remember_email(email: &str) -> Result<()> {
        Self::remember_email_at(&Self::config_path()?, email)
    }

    pub fn remember_email_at(path: &Path, email: &str) -> Result<()> {
        let mut on_disk = Self::load_from(path)?;
        on_disk.last_email = Some(email.to_string());
        on_disk.save_to(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply `IDEABOX_*` overrides from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(raw) = lookup(ENV_TOKEN_STORAGE) {
            match raw.parse() {
                Ok(storage) => self.token_storage = storage,
                Err(e) => warn!(error = %e, "Ignoring {}", ENV_TOKEN_STORAGE),
            }
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn route_table(&self) -> RouteTable {
        match self.routes {
            Some(ref routes) => RouteTable::new(routes.clone()),
            None => RouteTable::default(),
        }
    }

    pub fn refresh_settings(&self) -> RefreshSettings {
        RefreshSettings {
            refresh_path: self.refresh_path.clone(),
            exempt_paths: vec![self.login_path.clone()],
            timeout: Duration::from_secs(self.refresh_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"last_email": "mei@example.com"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.last_email.as_deref(), Some("mei@example.com"));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.entry_route, "/login");
        assert_eq!(config.token_storage, TokenStorage::File);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            token_storage: TokenStorage::Keyring,
            routes: Some(vec![Route::protected("submit", "/submit")]),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.token_storage, TokenStorage::Keyring);
        assert!(reloaded.route_table().resolve("/submit").unwrap().requires_auth);
        assert!(reloaded.route_table().resolve("/ideas").is_none());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_API_URL, "https://ideas.example.com/api"),
            (ENV_TOKEN_STORAGE, "KEYRING"),
        ]);
        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_base_url, "https://ideas.example.com/api");
        assert_eq!(config.token_storage, TokenStorage::Keyring);
    }

    #[test]
    fn test_invalid_storage_override_is_ignored() {
        let mut config = Config::default();
        config.apply_env(|key| (key == ENV_TOKEN_STORAGE).then(|| "vault".to_string()));
        assert_eq!(config.token_storage, TokenStorage::File);
    }

    #[test]
    fn test_remember_email_keeps_overrides_out_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_base_url": "https://ideas.example.com/api"}"#).unwrap();

        let mut running = Config::load_from(&path).unwrap();
        running.apply_env(|key| match key {
            ENV_API_URL => Some("http://127.0.0.1:9999/api".to_string()),
            ENV_TOKEN_STORAGE => Some("keyring".to_string()),
            _ => None,
        });
        assert_eq!(running.api_base_url, "http://127.0.0.1:9999/api");

        Config::remember_email_at(&path, "mei@example.com").unwrap();

        let stored = Config::load_from(&path).unwrap();
        assert_eq!(stored.last_email.as_deref(), Some("mei@example.com"));
        assert_eq!(stored.api_base_url, "https://ideas.example.com/api");
        assert_eq!(stored.token_storage, TokenStorage::File);
    }

    #[test]
    fn test_refresh_settings_exempt_login() {
        let settings = Config::default().refresh_settings();
        assert_eq!(settings.refresh_path, "/refresh");
        assert_eq!(settings.exempt_paths, vec!["/login".to_string()]);
        assert_eq!(settings.timeout, Duration::from_secs(10));
    }
}
