//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the backend URL override, the client origin, and the last
//! used login email. Environment variables take precedence over the file.
//!
//! Configuration is stored at `~/.config/skillswap/config.json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "skillswap";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend used when no override is set and the client is not running on
/// the development host.
pub const PRODUCTION_API_URL: &str = "https://skill-swap-backend-io0v.onrender.com";

/// Host name that means "local development, proxy API calls same-origin".
const DEV_HOST: &str = "localhost";

/// Origin reported when none is configured.
pub const DEFAULT_ORIGIN: &str = "app://skillswap";

/// Environment override for the backend base URL.
pub const API_URL_ENV: &str = "SKILLSWAP_API_URL";

/// Environment override for the client origin.
pub const ORIGIN_ENV: &str = "SKILLSWAP_ORIGIN";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Explicit backend base URL. Wins over host-based selection.
    pub api_url: Option<String>,
    /// Origin this client runs under, e.g. `http://localhost:5173`.
    pub origin: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Overlay `SKILLSWAP_API_URL` and `SKILLSWAP_ORIGIN` when set and non-empty.
    pub fn apply_env(&mut self) {
        if let Some(url) = non_empty_env(API_URL_ENV) {
            self.api_url = Some(url);
        }
        if let Some(origin) = non_empty_env(ORIGIN_ENV) {
            self.origin = Some(origin);
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

    /// The origin requests are sent from.
    pub fn origin(&self) -> &str {
        self.origin.as_deref().unwrap_or(DEFAULT_ORIGIN)
    }

    /// Pick the backend base URL: explicit override, then same-origin on
    /// the development host, then production.
    pub fn resolve_base_url(&self) -> String {
        let base = resolve_base_url(self.api_url.as_deref(), self.origin());
        if base.is_empty() {
            info!(origin = self.origin(), "Using same-origin API proxy");
        } else {
            info!(base_url = %base, "API base URL configured");
        }
        base
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Host part of an origin such as `http://localhost:5173`.
fn origin_host(origin: &str) -> Option<String> {
    reqwest::Url::parse(origin)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

/// Base URL selection without side effects. An empty result means requests
/// go to the client origin itself.
pub fn resolve_base_url(override_url: Option<&str>, origin: &str) -> String {
    if let Some(url) = override_url.filter(|u| !u.trim().is_empty()) {
        return url.trim().trim_end_matches('/').to_string();
    }
    if origin_host(origin).as_deref() == Some(DEV_HOST) {
        return String::new();
    }
    PRODUCTION_API_URL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        assert_eq!(
            resolve_base_url(Some("https://staging.example.com/"), "http://localhost:5173"),
            "https://staging.example.com"
        );
    }

    #[test]
    fn test_localhost_uses_same_origin() {
        assert_eq!(resolve_base_url(None, "http://localhost:5173"), "");
        assert_eq!(resolve_base_url(Some("  "), "http://localhost"), "");
    }

    #[test]
    fn test_other_hosts_use_production() {
        assert_eq!(resolve_base_url(None, "https://skillswap.app"), PRODUCTION_API_URL);
        assert_eq!(resolve_base_url(None, "http://127.0.0.1:5173"), PRODUCTION_API_URL);
        assert_eq!(resolve_base_url(None, DEFAULT_ORIGIN), PRODUCTION_API_URL);
    }

    #[test]
    fn test_default_origin() {
        let config = Config::default();
        assert_eq!(config.origin(), DEFAULT_ORIGIN);
    }
}
