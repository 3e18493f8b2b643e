//! Application configuration

pub mod prompts;
pub mod site;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub use site::SiteConfig;

/// Default Cohere API root
pub const DEFAULT_COHERE_URL: &str = "https://api.cohere.ai/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub cohere_api_key: String,
    pub cohere_url: String,
    /// Optional TOML file with page and model overrides
    pub site_file: Option<PathBuf>,
    /// Idle time after which a browser session is discarded
    pub session_ttl: Duration,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// A missing or blank `COHERE_API_KEY` is an error: without a credential
    /// there is nothing this service can do.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let cohere_api_key = lookup("COHERE_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey("COHERE_API_KEY"))?;

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8501),
            cohere_api_key,
            cohere_url: lookup("COHERE_BASE_URL").unwrap_or_else(|| DEFAULT_COHERE_URL.into()),
            site_file: lookup("SMARTTOUR_SITE").map(PathBuf::from),
            session_ttl: Duration::from_secs(
                lookup("SMARTTOUR_SESSION_TTL_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            ),
        })
    }

    /// Load the site file if one is configured, otherwise the built-in page
    pub fn load_site(&self) -> Result<SiteConfig, ConfigError> {
        match &self.site_file {
            Some(path) => SiteConfig::from_file(path),
            None => Ok(SiteConfig::default()),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingApiKey(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}
