use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Public demo key for the OMDb API, used when no key is configured
pub const DEMO_API_KEY: &str = "a4954f1c";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub omdb: OmdbConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmdbConfig {
    #[serde(default = "default_omdb_base_url")]
    pub base_url: String,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Key the watched list is persisted under
    #[serde(default = "default_watched_key")]
    pub watched_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Title shown when no movie detail is open
    #[serde(default = "default_title")]
    pub default_title: String,
    #[serde(default = "default_true")]
    pub set_terminal_title: bool,
}

pub fn default_omdb_base_url() -> String {
    "https://www.omdbapi.com/".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_watched_key() -> String {
    "watched".to_string()
}

fn default_title() -> String {
    "usePopcorn".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_omdb_base_url(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            watched_key: default_watched_key(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_title: default_title(),
            set_terminal_title: default_true(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file if present, otherwise fall back to defaults
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = self.omdb.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(anyhow::anyhow!("omdb.base_url must be an http(s) URL, got '{}'", url));
        }

        if self.omdb.http_timeout_secs == 0 {
            return Err(anyhow::anyhow!("omdb.http_timeout_secs must be greater than zero"));
        }

        if self.storage.watched_key.trim().is_empty() {
            return Err(anyhow::anyhow!("storage.watched_key cannot be empty"));
        }

        Ok(())
    }
}
