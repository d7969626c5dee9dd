//! Credentials and configuration file handling.
//!
//! Credentials are resolved in this order: explicit value (CLI flag),
//! environment (`DIFY_API_KEY`, `DIFY_BASE_URL`), then the optional TOML file:
//!
//! ```toml
//! [api]
//! base_url = "https://api.dify.ai/v1"
//! timeout_secs = 60
//!
//! [defaults]
//! dataset_id = "8a2b..."
//! page_size = 20
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::error::Error;

pub const API_KEY_ENV: &str = "DIFY_API_KEY";
pub const BASE_URL_ENV: &str = "DIFY_BASE_URL";

/// API key and base URL for the remote knowledge API.
///
/// Both fields are guaranteed non-empty once constructed.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    base_url: String,
}

impl Credentials {
    /// Validate and build credentials. A trailing `/` on the base URL is dropped.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> crate::Result<Self> {
        let api_key = api_key.into().trim().to_string();
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();

        if api_key.is_empty() {
            return Err(Error::Config(format!(
                "API key is required. Set {} or pass it explicitly.",
                API_KEY_ENV
            )));
        }
        if base_url.is_empty() {
            return Err(Error::Config(format!(
                "Base URL is required. Set {} or pass it explicitly.",
                BASE_URL_ENV
            )));
        }

        Ok(Self { api_key, base_url })
    }

    /// Read credentials from `DIFY_API_KEY` and `DIFY_BASE_URL`.
    pub fn from_env() -> crate::Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).unwrap_or_default();
        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_default();
        Self::new(api_key, base_url)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout. Unset leaves the HTTP client default in place.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub dataset_id: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            dataset_id: None,
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> u32 {
    20
}

/// Load and validate a configuration file.
///
/// When `required` is false a missing file yields [`Config::default`]; an
/// explicitly requested file must exist.
pub fn load_config(path: &Path, required: bool) -> Result<Config> {
    if !path.exists() && !required {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.defaults.page_size == 0 {
        anyhow::bail!("defaults.page_size must be >= 1");
    }

    if config.api.timeout_secs == Some(0) {
        anyhow::bail!("api.timeout_secs must be > 0");
    }

    Ok(config)
}

/// Pick the first non-empty value among an explicit override and the config
/// file, then validate the pair.
///
/// Environment variables are expected to arrive through `explicit_*` (the CLI
/// binds them with clap's `env` attribute).
pub fn resolve_credentials(
    explicit_key: Option<&str>,
    explicit_url: Option<&str>,
    config: &Config,
) -> crate::Result<Credentials> {
    let pick = |explicit: Option<&str>, file: Option<&String>| {
        explicit
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .or_else(|| file.cloned())
            .unwrap_or_default()
    };

    Credentials::new(
        pick(explicit_key, config.api.api_key.as_ref()),
        pick(explicit_url, config.api.base_url.as_ref()),
    )
}
