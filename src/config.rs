//! Configuration parsing and validation.
//!
//! Grocer reads an optional TOML file (default `./config/grocer.toml`).
//! Every field has a default, so a missing file yields
//! [`Config::minimal`]. The two backend URLs can also be overridden from
//! the environment:
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `GROCER_API_BASE_URL` | `api.base_url` |
//! | `GROCER_LLM_API_URL` | `api.llm_base_url` |
//!
//! # Example
//!
//! ```toml
//! [api]
//! base_url = "http://0.0.0.0:8000/api/v1/grocery"
//! llm_base_url = "http://localhost:3001/api/llm"
//! timeout_secs = 30
//!
//! [cache]
//! path = "./data/grocer-cache.json"
//!
//! [view]
//! page_size = 10
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use grocer_core::engine::DEFAULT_PAGE_SIZE;

pub const API_BASE_URL_ENV: &str = "GROCER_API_BASE_URL";
pub const LLM_API_URL_ENV: &str = "GROCER_LLM_API_URL";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            llm_base_url: default_llm_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://0.0.0.0:8000/api/v1/grocery".to_string()
}
fn default_llm_base_url() -> String {
    "http://localhost:3001/api/llm".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
    /// When false, every load goes to the backend and nothing is written.
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            enabled: default_cache_enabled(),
        }
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("./data/grocer-cache.json")
}
fn default_cache_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct ViewConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Config {
    /// All defaults. Used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url;
            }
        }
        if let Ok(url) = std::env::var(LLM_API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.llm_base_url = url;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.view.page_size == 0 {
            bail!("view.page_size must be >= 1");
        }
        if self.api.timeout_secs == 0 {
            bail!("api.timeout_secs must be >= 1");
        }
        for (name, url) in [
            ("api.base_url", &self.api.base_url),
            ("api.llm_base_url", &self.api.llm_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                bail!("{} must start with http:// or https:// (got '{}')", name, url);
            }
        }
        Ok(())
    }
}

/// Parse and validate a config string. Environment overrides are not applied.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

/// Load the config file, falling back to defaults when it does not exist,
/// then apply environment overrides and validate.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")?
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Config::minimal()
    };

    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}
