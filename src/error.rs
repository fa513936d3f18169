//! Error types for provider configuration.

use thiserror::Error;

/// Errors raised while resolving configuration or building the API client.
///
/// Lifecycle operations never return these; they report through diagnostics.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A setting is present but unusable.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// No API token was found in any configuration layer.
    #[error("no API token configured; set TRACKER_API_TOKEN or api_token in the config file")]
    MissingCredentials,

    /// The layered configuration could not be read or deserialized.
    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}
