//! Application configuration.
//!
//! Loaded from an optional TOML file. Every section and field has a default,
//! so an absent file or a partial one is valid:
//!
//! ```toml
//! [storage]
//! dir = "."
//! max_age_months = 3
//!
//! [openai]
//! model = "gpt-3.5-turbo"
//! request_timeout_secs = 30
//!
//! [baskets]
//! good_sectors = ["Utilities", "Consumer Goods"]
//! bad_sectors = ["Technology", "Industrial Goods"]
//!
//! [[news.sources]]
//! name = "financial"
//! url = "https://www.ft.com/us"
//! ```
//!
//! The API key is never read from this file. It comes from the environment,
//! with a `.env` file in the working directory loaded first.

use crate::data::staleness::{StalenessPolicy, DEFAULT_MAX_AGE_MONTHS};
use crate::news::NewsSource;
use crate::trade::SectorBaskets;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "sectorlab.toml";

/// Configuration and credential errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{var} is not set. Please check your .env file.")]
    MissingCredential { var: String },

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub universe: UniverseConfig,
    pub openai: OpenAiConfig,
    pub baskets: SectorBaskets,
    pub news: NewsConfig,
}

/// Snapshot location and freshness.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: PathBuf,
    pub max_age_months: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            max_age_months: DEFAULT_MAX_AGE_MONTHS,
        }
    }
}

impl StorageConfig {
    pub fn policy(&self) -> StalenessPolicy {
        StalenessPolicy::new(self.max_age_months)
    }
}

/// Where the ticker universe is scraped from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UniverseConfig {
    pub url: String,
    pub request_timeout_secs: Option<u64>,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            url: "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies".into(),
            request_timeout_secs: None,
        }
    }
}

/// Chat-completion API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub request_timeout_secs: Option<u64>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-3.5-turbo".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            request_timeout_secs: None,
        }
    }
}

/// Headline sources for the news summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NewsConfig {
    pub sources: Vec<NewsSource>,
    pub headlines_per_source: usize,
    pub request_timeout_secs: Option<u64>,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            sources: NewsSource::defaults(),
            headlines_per_source: 2,
            request_timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit path if given, else `sectorlab.toml` when present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.openai.model.trim().is_empty() {
            return Err(ConfigError::Invalid("openai.model must not be empty".into()));
        }
        if self.openai.api_key_env.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "openai.api_key_env must not be empty".into(),
            ));
        }
        if self.news.headlines_per_source == 0 {
            return Err(ConfigError::Invalid(
                "news.headlines_per_source must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// API key for the chat-completion provider. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Read the key from `var`, after loading `.env` if one exists.
    pub fn from_env(var: &str) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(var, |v| std::env::var(v).ok())
    }

    /// Resolve the key through `lookup`. Empty values count as missing.
    pub fn from_lookup<F>(var: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match lookup(var) {
            Some(key) if !key.trim().is_empty() => Ok(Self(key.trim().to_string())),
            _ => Err(ConfigError::MissingCredential {
                var: var.to_string(),
            }),
        }
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}
