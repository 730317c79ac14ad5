//! Client configuration with documented defaults and environment loading.

use std::time::Duration;

/// Production SMS.IR REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://RestfulSms.com/api";

/// How long an issued token is trusted before it is fetched again.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

pub const ENV_API_KEY: &str = "SMSIR_API_KEY";
pub const ENV_SECRET_KEY: &str = "SMSIR_SECRET_KEY";
pub const ENV_BASE_URL: &str = "SMSIR_BASE_URL";
pub const ENV_DISABLE_CACHE: &str = "SMSIR_DISABLE_CACHE";
pub const ENV_TOKEN_TTL_SECS: &str = "SMSIR_TOKEN_TTL_SECS";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL: {value}")]
    InvalidBaseUrl { value: String },

    #[error("invalid boolean for {name}: {value}")]
    InvalidFlag { name: &'static str, value: String },

    #[error("invalid token TTL seconds: {value}")]
    InvalidTtl { value: String },
}

#[derive(Clone, PartialEq, Eq)]
/// Settings for [`crate::SmsIrClient`].
///
/// Every field can be set on its own; [`Config::default`] gives empty keys, the production
/// base URL, caching enabled and a 30 minute token lifetime.
pub struct Config {
    pub api_key: String,
    pub secret_key: String,
    pub base_url: String,
    /// Fetch a fresh token on every call instead of reusing a cached one.
    pub disable_cache: bool,
    pub token_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            disable_cache: false,
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key)
            .field("secret_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("disable_cache", &self.disable_cache)
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl Config {
    /// Configuration with the given credentials and every other field at its default.
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            ..Self::default()
        }
    }

    /// Read `SMSIR_*` variables from the process environment. Unset variables keep defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`Config::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(api_key) = lookup(ENV_API_KEY) {
            config.api_key = api_key;
        }
        if let Some(secret_key) = lookup(ENV_SECRET_KEY) {
            config.secret_key = secret_key;
        }
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|value| !value.trim().is_empty()) {
            config.base_url = base_url.trim().to_owned();
        }
        if let Some(value) = lookup(ENV_DISABLE_CACHE) {
            config.disable_cache = parse_flag(ENV_DISABLE_CACHE, &value)?;
        }
        if let Some(value) = lookup(ENV_TOKEN_TTL_SECS) {
            let secs = value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTtl {
                    value: value.clone(),
                })?;
            config.token_ttl = Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }

    /// Check that the base URL is an absolute `http`/`https` URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidBaseUrl {
            value: self.base_url.clone(),
        };
        let url = url::Url::parse(&self.base_url).map_err(|_| invalid())?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(invalid());
        }
        Ok(())
    }

    /// Absolute URL for `path` below the base URL (`{base}/{path}`).
    pub(crate) fn endpoint(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: value.to_owned(),
        }),
    }
}
