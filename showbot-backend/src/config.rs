use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

pub const LISTINGS_URL_ENV: &str = "MLB_LISTINGS_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_listings_url")]
    pub listings_url: String,

    #[serde(default = "default_items_url")]
    pub items_url: String,

    /// Paged captains endpoint, used when no captains file is configured
    #[serde(default)]
    pub captains_url: Option<String>,

    /// Local JSON dump of the captains dataset
    #[serde(default)]
    pub captains_file: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_listing_refresh_secs")]
    pub listing_refresh_secs: u64,

    #[serde(default = "default_item_refresh_minutes")]
    pub item_refresh_minutes: u64,

    /// Keep the installed snapshot when a refresh comes back empty
    #[serde(default = "default_keep_previous_on_empty")]
    pub keep_previous_on_empty: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_listings_url() -> String {
    "https://mlb24.theshow.com/apis/listings.json".to_string()
}

fn default_items_url() -> String {
    "https://mlb24.theshow.com/apis/items.json".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_listing_refresh_secs() -> u64 {
    60
}

fn default_item_refresh_minutes() -> u64 {
    30
}

fn default_keep_previous_on_empty() -> bool {
    true
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            listings_url: default_listings_url(),
            items_url: default_items_url(),
            captains_url: None,
            captains_file: None,
            request_timeout_secs: default_request_timeout_secs(),
            listing_refresh_secs: default_listing_refresh_secs(),
            item_refresh_minutes: default_item_refresh_minutes(),
            keep_previous_on_empty: default_keep_previous_on_empty(),
        }
    }
}

impl BackendConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: BackendConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(config)
    }

    /// Apply environment overrides on top of the file values.
    pub fn apply_env(&mut self) {
        self.apply_listings_override(std::env::var(LISTINGS_URL_ENV).ok());
    }

    fn apply_listings_override(&mut self, value: Option<String>) {
        if let Some(url) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            self.listings_url = url;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn listing_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.listing_refresh_secs)
    }

    pub fn item_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.item_refresh_minutes * 60)
    }
}

pub static CONFIG: OnceLock<BackendConfig> = OnceLock::new();

/// Load `path` (falling back to defaults when it does not exist), apply
/// environment overrides and publish the result in [`CONFIG`].
pub fn read_config(path: impl AsRef<Path>) -> anyhow::Result<&'static BackendConfig> {
    let path = path.as_ref();
    let mut config = if path.exists() {
        BackendConfig::from_file(path)?
    } else {
        eprintln!("Config file {:?} not found, using defaults", path);
        BackendConfig::default()
    };
    config.apply_env();

    CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("Configuration already loaded"))?;
    CONFIG.get().context("Configuration missing after load")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: BackendConfig = toml::from_str("").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.listing_refresh_interval(), Duration::from_secs(60));
        assert_eq!(config.item_refresh_interval(), Duration::from_secs(30 * 60));
        assert!(config.keep_previous_on_empty);
        assert!(config.captains_url.is_none());
    }

    #[test]
    fn test_partial_file() {
        let config: BackendConfig = toml::from_str(
            r#"
            log_level = "debug"
            listing_refresh_secs = 120
            captains_file = "data/captains.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.listing_refresh_secs, 120);
        assert_eq!(config.captains_file.as_deref(), Some("data/captains.json"));
        assert_eq!(config.items_url, default_items_url());
    }

    #[test]
    fn test_listings_override() {
        let mut config = BackendConfig::default();
        config.apply_listings_override(Some("   ".to_string()));
        assert_eq!(config.listings_url, default_listings_url());

        config.apply_listings_override(Some("http://localhost:9000/listings.json".to_string()));
        assert_eq!(config.listings_url, "http://localhost:9000/listings.json");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "item_refresh_minutes = 5\n").unwrap();

        let config = BackendConfig::from_file(&path).unwrap();
        assert_eq!(config.item_refresh_interval(), Duration::from_secs(300));

        assert!(BackendConfig::from_file(dir.path().join("missing.toml")).is_err());
    }
}
