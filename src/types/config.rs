//! Configuration structures.
//!
//! Configuration is loaded from environment variables; CLI flags in the
//! binary override individual fields.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::{Error, Result};

/// Production Sequence API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.getsequence.io";

/// Environment variable holding the user's access token.
pub const DEFAULT_ACCESS_TOKEN_ENV: &str = "SEQUENCE_ACCESS_TOKEN";

/// Global server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Sequence API client configuration.
    #[serde(default)]
    pub client: ClientConfig,

    /// Where the ambient credential comes from.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from `SEQUENCE_*` environment variables.
    ///
    /// Unset variables keep their defaults; set but invalid values are errors.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("SEQUENCE_API_BASE_URL").filter(|v| !v.is_empty()) {
            config.client.base_url = url;
        }
        if let Some(raw) = lookup("SEQUENCE_TIMEOUT").filter(|v| !v.is_empty()) {
            config.client.timeout = parse_timeout(&raw)?;
        }
        if let Some(var) = lookup("SEQUENCE_ACCESS_TOKEN_ENV").filter(|v| !v.is_empty()) {
            config.credentials.access_token_env = var;
        }
        if let Some(format) = lookup("SEQUENCE_LOG_FORMAT").filter(|v| !v.is_empty()) {
            config.observability.log_format = format.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        self.client.validate()
    }
}

/// Parse a humantime duration such as `30s` or `1m 30s`.
pub fn parse_timeout(raw: &str) -> Result<Duration> {
    let timeout = humantime_serde::re::humantime::parse_duration(raw)
        .map_err(|e| Error::config(format!("invalid timeout '{}': {}", raw, e)))?;
    if timeout.is_zero() {
        return Err(Error::config("timeout must be greater than zero"));
    }
    Ok(timeout)
}

/// Sequence API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API base address.
    pub base_url: String,

    /// Total request timeout.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(Error::config(format!(
                "base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(Error::config("timeout must be greater than zero"));
        }
        Ok(())
    }
}

/// Credential source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Environment variable read for the access token on each `get_accounts`.
    pub access_token_env: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            access_token_env: DEFAULT_ACCESS_TOKEN_ENV.to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log line format on stderr.
    pub log_format: LogFormat,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("json") {
            Ok(LogFormat::Json)
        } else if s.eq_ignore_ascii_case("compact") || s.eq_ignore_ascii_case("text") {
            Ok(LogFormat::Compact)
        } else {
            Err(Error::config(format!(
                "unknown log format '{}', expected 'compact' or 'json'",
                s
            )))
        }
    }
}
