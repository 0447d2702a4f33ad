//! Provider configuration.
//!
//! Settings come from an optional TOML file, overlaid with process
//! environment variables for the secrets. Nothing in the provider clients
//! reads the environment directly; they receive these structs.
//!
//! ```toml
//! [jquants]
//! base_url = "https://api.jquants.com/v1"
//! timeout_secs = 30
//!
//! [alphavantage]
//! function = "TIME_SERIES_DAILY"
//! ```

use crate::data::alphavantage::SeriesFunction;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const ENV_JQUANTS_EMAIL: &str = "JQUANTS_EMAIL";
pub const ENV_JQUANTS_PASSWORD: &str = "JQUANTS_PASSWORD";
pub const ENV_ALPHAVANTAGE_API_KEY: &str = "ALPHAVANTAGE_API_KEY";

pub const JQUANTS_BASE_URL: &str = "https://api.jquants.com/v1";
pub const ALPHAVANTAGE_BASE_URL: &str = "https://www.alphavantage.co";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Alpha Vantage's public demo key, used when no key is configured.
pub const ALPHAVANTAGE_DEMO_KEY: &str = "demo";

/// Number of leading characters of a secret that may appear in diagnostics.
pub const SECRET_PREFIX_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Show only a short prefix of a secret: at most `SECRET_PREFIX_LEN`
/// characters and never more than half of it.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "<empty>".to_string();
    }
    let visible = SECRET_PREFIX_LEN.min(secret.chars().count() / 2);
    let prefix: String = secret.chars().take(visible).collect();
    format!("{prefix}…")
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JQuantsConfig {
    pub email: String,
    pub password: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for JQuantsConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            base_url: JQUANTS_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl JQuantsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for JQuantsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JQuantsConfig")
            .field("email", &mask_secret(&self.email))
            .field("password", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaVantageConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub function: SeriesFunction,
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            api_key: ALPHAVANTAGE_DEMO_KEY.to_string(),
            base_url: ALPHAVANTAGE_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            function: SeriesFunction::Daily,
        }
    }
}

impl AlphaVantageConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for AlphaVantageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlphaVantageConfig")
            .field("api_key", &mask_secret(&self.api_key))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("function", &self.function)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotelabConfig {
    pub jquants: JQuantsConfig,
    pub alphavantage: AlphaVantageConfig,
}

impl QuotelabConfig {
    /// Parse a config from a TOML string. Missing keys take defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay credentials from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay credentials using `lookup`. Empty values are ignored.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(email) = get(ENV_JQUANTS_EMAIL) {
            self.jquants.email = email;
        }
        if let Some(password) = get(ENV_JQUANTS_PASSWORD) {
            self.jquants.password = password;
        }
        if let Some(key) = get(ENV_ALPHAVANTAGE_API_KEY) {
            self.alphavantage.api_key = key;
        }
    }
}
