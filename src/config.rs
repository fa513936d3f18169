//! # Provider Configuration
//!
//! Settings are resolved once per configure call from four layers, each
//! overriding the one before:
//!
//! 1. built-in defaults,
//! 2. an optional TOML file,
//! 3. `TRACKER_*` environment variables (`TRACKER_ENDPOINT`, `TRACKER_API_TOKEN`, ...),
//! 4. explicit overrides supplied by the caller (e.g. CLI flags).
//!
//! The merged result is validated into a [`ProviderConfig`]. The API token is
//! held as a [`SecretString`] from that point on and never appears in `Debug`
//! output.

use crate::error::ConfigError;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const ENV_PREFIX: &str = "TRACKER_";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOOKUP_ATTEMPTS: u32 = 5;
pub const DEFAULT_LOOKUP_INTERVAL_MS: u64 = 2000;

fn default_user_agent() -> String {
    concat!("tracker-provider/", env!("CARGO_PKG_VERSION")).to_string()
}

/// The merged, not yet validated settings. Kept private so the raw token
/// never escapes this module.
#[derive(Deserialize, Serialize)]
struct RawConfig {
    endpoint: Option<String>,
    email: Option<String>,
    api_token: Option<String>,
    timeout_secs: u64,
    operation_timeout_secs: u64,
    lookup_attempts: u32,
    lookup_interval_ms: u64,
    user_agent: String,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            email: None,
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            operation_timeout_secs: 0,
            lookup_attempts: DEFAULT_LOOKUP_ATTEMPTS,
            lookup_interval_ms: DEFAULT_LOOKUP_INTERVAL_MS,
            user_agent: default_user_agent(),
        }
    }
}

/// Highest-precedence settings, typically from command-line flags.
///
/// Unset fields leave the lower layers untouched.
#[derive(Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_timeout_secs: Option<u64>,
}

/// Validated provider settings.
#[derive(Debug)]
pub struct ProviderConfig {
    pub endpoint: Url,
    /// When present, requests use Basic auth with this address; otherwise Bearer.
    pub email: Option<String>,
    pub api_token: SecretString,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Budget for a whole lifecycle operation, post-call hooks included.
    pub operation_timeout: Option<Duration>,
    pub lookup_attempts: u32,
    pub lookup_interval: Duration,
    pub user_agent: String,
}

impl ProviderConfig {
    /// The layered sources, before extraction.
    pub fn figment(file: Option<&Path>, overrides: &ConfigOverrides) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(RawConfig::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides))
    }

    pub fn load(file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment(file, overrides))
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let raw: RawConfig = figment.extract()?;
        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self, ConfigError> {
        let endpoint = raw
            .endpoint
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| ConfigError::invalid("endpoint", "an endpoint URL is required"))?;
        let endpoint = Url::parse(endpoint.trim())
            .map_err(|e| ConfigError::invalid("endpoint", e.to_string()))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "endpoint",
                format!("unsupported scheme '{}'; use http or https", endpoint.scheme()),
            ));
        }
        if endpoint.host_str().is_none() {
            return Err(ConfigError::invalid("endpoint", "the URL has no host"));
        }

        let email = raw.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
        if let Some(email) = &email {
            if !email.contains('@') {
                return Err(ConfigError::invalid("email", "expected an email address"));
            }
        }

        let token = raw
            .api_token
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingCredentials)?;

        if raw.timeout_secs == 0 {
            return Err(ConfigError::invalid("timeout_secs", "must be greater than zero"));
        }
        if raw.lookup_attempts == 0 {
            return Err(ConfigError::invalid("lookup_attempts", "must be at least 1"));
        }
        if raw.user_agent.trim().is_empty() {
            return Err(ConfigError::invalid("user_agent", "must not be empty"));
        }

        Ok(Self {
            endpoint,
            email,
            api_token: SecretString::from(token),
            timeout: Duration::from_secs(raw.timeout_secs),
            operation_timeout: (raw.operation_timeout_secs > 0)
                .then(|| Duration::from_secs(raw.operation_timeout_secs)),
            lookup_attempts: raw.lookup_attempts,
            lookup_interval: Duration::from_millis(raw.lookup_interval_ms),
            user_agent: raw.user_agent,
        })
    }
}
