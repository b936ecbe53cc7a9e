use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub mock: MockConfig,
}

/// Remote collection endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the playlist resource, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Group identifier embedded in list/create paths.
    #[serde(default = "default_group_id")]
    pub group_id: String,
    /// Request timeout. Unset means whatever reqwest does by default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Ask a second time before update and delete requests are sent.
    #[serde(default = "default_confirm_destructive")]
    pub confirm_destructive: bool,
}

/// Local mock API server (playlist-mockd).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            group_id: default_group_id(),
            timeout_secs: None,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            confirm_destructive: default_confirm_destructive(),
        }
    }
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

fn default_base_url() -> String {
    "https://webfmsi.singapoly.com/api/playlist".to_string()
}

fn default_group_id() -> String {
    "33".to_string()
}

fn default_confirm_destructive() -> bool {
    true
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8990
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Read `path`, writing a default config there first if it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api.base_url.starts_with("https://"));
        assert!(config.api.base_url.ends_with("/api/playlist"));
        assert_eq!(config.api.group_id, "33");
        assert!(config.api.timeout().is_none());
        assert!(config.ui.confirm_destructive);
        assert_eq!(config.mock.bind_address, "127.0.0.1");
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.api.group_id, "33");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[api]\nbase_url = \"http://127.0.0.1:8990/api/playlist\"\ntimeout_secs = 5\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8990/api/playlist");
        assert_eq!(config.api.group_id, "33");
        assert_eq!(config.api.timeout(), Some(Duration::from_secs(5)));
        assert!(config.ui.confirm_destructive);
        assert_eq!(config.mock.port, 8990);
    }
}
