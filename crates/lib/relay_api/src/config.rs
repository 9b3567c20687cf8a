//! Relay and backend configuration.

use std::fmt;
use std::time::Duration;

use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_UPSTREAM_URL: &str = "http://127.0.0.1:5000/chat";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_COMPLETION_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_COMPLETION_MODEL: &str = "openai/gpt-oss-20b:free";

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}: invalid URL '{value}': {reason}")]
    InvalidUrl {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{var}: expected a whole number of seconds, got '{value}'")]
    InvalidTimeout { var: &'static str, value: String },
}

/// A secret value. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Compares `candidate` against the secret in constant time.
    ///
    /// Both sides are SHA-256 hashed first so the comparison does not leak
    /// the secret's length.
    pub fn matches(&self, candidate: &str) -> bool {
        let expected = Sha256::digest(self.0.as_bytes());
        let given = Sha256::digest(candidate.as_bytes());
        expected
            .iter()
            .zip(given.iter())
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
    }

    /// Empty and whitespace-only values count as absent.
    fn from_value(value: Option<String>) -> Option<Self> {
        value.filter(|v| !v.trim().is_empty()).map(Self)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Configuration for the relay handler.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3000").
    pub bind_addr: String,
    /// Fixed upstream the relay forwards to.
    pub upstream_url: Url,
    /// Bearer credential attached to upstream calls.
    pub upstream_credential: Option<Credential>,
    /// Deadline for a whole upstream exchange.
    pub upstream_timeout: Duration,
}

impl RelayConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                | Default                      |
    /// |-------------------------|------------------------------|
    /// | `BIND_ADDR`             | `127.0.0.1:3000`             |
    /// | `RELAY_UPSTREAM_URL`    | `http://127.0.0.1:5000/chat` |
    /// | `RELAY_UPSTREAM_KEY`    | unset                        |
    /// | `UPSTREAM_TIMEOUT_SECS` | `30`                         |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            upstream_url: parse_http_url(
                "RELAY_UPSTREAM_URL",
                lookup("RELAY_UPSTREAM_URL").unwrap_or_else(|| DEFAULT_UPSTREAM_URL.into()),
            )?,
            upstream_credential: Credential::from_value(lookup("RELAY_UPSTREAM_KEY")),
            upstream_timeout: parse_timeout(lookup("UPSTREAM_TIMEOUT_SECS"))?,
        })
    }

    pub fn with_upstream_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.upstream_url = parse_http_url("upstream URL", url.to_string())?;
        Ok(self)
    }
}

/// Configuration for the chat backend.
#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub bind_addr: String,
    /// Key callers must present as `Authorization: Bearer <key>`.
    pub access_key: Option<Credential>,
    /// Key for the chat completion API.
    pub completion_api_key: Option<Credential>,
    pub completion_url: Url,
    pub model: String,
    /// Browser origins allowed to call the backend. Compared without a
    /// trailing `/`.
    pub allowed_origins: Vec<String>,
    pub completion_timeout: Duration,
}

impl BackendConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                | Default                                         |
    /// |-------------------------|-------------------------------------------------|
    /// | `BIND_ADDR`             | `127.0.0.1:3000`                                |
    /// | `CHAT_ACCESS_KEY`       | unset (every request rejected)                  |
    /// | `COMPLETION_API_KEY`    | unset                                           |
    /// | `COMPLETION_API_URL`    | `https://openrouter.ai/api/v1/chat/completions` |
    /// | `COMPLETION_MODEL`      | `openai/gpt-oss-20b:free`                       |
    /// | `ALLOWED_ORIGINS`       | empty, comma-separated                          |
    /// | `UPSTREAM_TIMEOUT_SECS` | `30`                                            |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            access_key: Credential::from_value(lookup("CHAT_ACCESS_KEY")),
            completion_api_key: Credential::from_value(lookup("COMPLETION_API_KEY")),
            completion_url: parse_http_url(
                "COMPLETION_API_URL",
                lookup("COMPLETION_API_URL").unwrap_or_else(|| DEFAULT_COMPLETION_URL.into()),
            )?,
            model: lookup("COMPLETION_MODEL").unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.into()),
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_default(),
            completion_timeout: parse_timeout(lookup("UPSTREAM_TIMEOUT_SECS"))?,
        })
    }

    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        let origin = origin.trim_end_matches('/');
        self.allowed_origins.iter().any(|o| o == origin)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_http_url(var: &'static str, value: String) -> Result<Url, ConfigError> {
    let url = Url::parse(&value).map_err(|e| ConfigError::InvalidUrl {
        var,
        value: value.clone(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            var,
            value,
            reason: "scheme must be http or https".into(),
        });
    }
    Ok(url)
}

fn parse_timeout(value: Option<String>) -> Result<Duration, ConfigError> {
    match value {
        None => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        Some(v) => v
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or(ConfigError::InvalidTimeout {
                var: "UPSTREAM_TIMEOUT_SECS",
                value: v,
            }),
    }
}
