//! # Tracker HTTP Client
//!
//! A thin `reqwest` wrapper that turns every exchange into an
//! [`ApiOutcome`]. HTTP statuses are never converted into errors here: a 404
//! or a 500 comes back as response metadata and the classifier decides what it
//! means for the operation. Only failures below the status line (timeouts,
//! refused connections, unreadable bodies) populate the error slot.
//!
//! Redirects are not followed, so the recorded status is always the one the
//! server actually sent.

use crate::config::ProviderConfig;
use crate::error::ConfigError;
use crud_engine::{redact, ApiError, ApiOutcome, OpContext, ResponseMeta};
use reqwest::header::ACCEPT;
use reqwest::{redirect, Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Path prefix of the REST v3 API.
pub const API_PREFIX: [&str; 3] = ["rest", "api", "3"];

/// Authenticated client for one tracker site.
#[derive(Debug)]
pub struct TrackerClient {
    http: Client,
    base: Url,
    email: Option<String>,
    token: SecretString,
    lookup_attempts: u32,
    lookup_interval: Duration,
}

impl TrackerClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base: config.endpoint.clone(),
            email: config.email.clone(),
            token: config.api_token.clone(),
            lookup_attempts: config.lookup_attempts,
            lookup_interval: config.lookup_interval,
        })
    }

    /// How many times a lookup that may lag behind a write is attempted.
    pub fn lookup_attempts(&self) -> u32 {
        self.lookup_attempts
    }

    pub fn lookup_interval(&self) -> Duration {
        self.lookup_interval
    }

    /// Absolute URL of an API path, e.g. `["project", "10001"]`.
    ///
    /// Segments are percent-encoded individually, so identifiers cannot
    /// escape their path position.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(API_PREFIX).extend(segments);
        }
        url
    }

    /// A request with authentication and `Accept: application/json` applied.
    pub fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let builder = self
            .http
            .request(method, self.endpoint(segments))
            .header(ACCEPT, "application/json");
        match &self.email {
            Some(email) => builder.basic_auth(email, Some(self.token.expose_secret())),
            None => builder.bearer_auth(self.token.expose_secret()),
        }
    }

    /// Sends `request` and decodes a 2xx body as `T`.
    ///
    /// Non-2xx responses and empty bodies yield no model. A body that fails to
    /// decode keeps its metadata and carries [`ApiError::Decode`].
    #[instrument(name = "http", skip_all)]
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        ctx: &OpContext,
        request: RequestBuilder,
    ) -> ApiOutcome<T> {
        let meta = match exchange(ctx, request).await {
            Ok(meta) => meta,
            Err(err) => return ApiOutcome::failed(err),
        };
        if !is_2xx(meta.status) || meta.body.is_empty() {
            return ApiOutcome::status_only(meta);
        }
        match serde_json::from_slice::<T>(&meta.body) {
            Ok(model) => ApiOutcome::ok(model, meta),
            Err(err) => {
                let reason = err.to_string();
                ApiOutcome::status_only(meta).with_error(ApiError::Decode(reason))
            }
        }
    }

    /// Sends `request` when only the status matters (deletes, 204 updates).
    #[instrument(name = "http", skip_all)]
    pub async fn send_status(&self, ctx: &OpContext, request: RequestBuilder) -> ApiOutcome<()> {
        match exchange(ctx, request).await {
            Ok(meta) if is_2xx(meta.status) => ApiOutcome::ok((), meta),
            Ok(meta) => ApiOutcome::status_only(meta),
            Err(err) => ApiOutcome::failed(err),
        }
    }
}

fn is_2xx(status: u16) -> bool {
    (200..300).contains(&status)
}

async fn exchange(ctx: &OpContext, request: RequestBuilder) -> Result<ResponseMeta, ApiError> {
    let round_trip = async {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(transport_error)?;
        debug!(status, bytes = body.len(), "response received");
        Ok::<_, ApiError>(ResponseMeta {
            status,
            headers,
            body: body.to_vec(),
        })
    };
    ctx.run(round_trip).await?
}

fn transport_error(err: reqwest::Error) -> ApiError {
    let text = redact(&err.to_string());
    if err.is_timeout() {
        ApiError::Timeout(text)
    } else if err.is_connect() {
        ApiError::Connect(text)
    } else if err.is_decode() || err.is_body() {
        ApiError::Decode(text)
    } else {
        ApiError::Transport(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigOverrides;
    use figment::Jail;

    fn client_for(endpoint: &str) -> TrackerClient {
        let mut client = None;
        Jail::expect_with(|_jail| {
            let overrides = ConfigOverrides {
                endpoint: Some(endpoint.to_string()),
                api_token: Some("t".to_string()),
                ..ConfigOverrides::default()
            };
            let config = ProviderConfig::load(None, &overrides).unwrap();
            client = Some(TrackerClient::new(&config).unwrap());
            Ok(())
        });
        client.unwrap()
    }

    #[test]
    fn test_endpoint_appends_api_prefix() {
        let client = client_for("https://acme.example.net");
        assert_eq!(
            client.endpoint(&["project", "10001"]).as_str(),
            "https://acme.example.net/rest/api/3/project/10001"
        );
    }

    #[test]
    fn test_endpoint_keeps_context_path() {
        let client = client_for("https://acme.example.net/tracker/");
        assert_eq!(
            client.endpoint(&["field"]).as_str(),
            "https://acme.example.net/tracker/rest/api/3/field"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = client_for("https://acme.example.net");
        let url = client.endpoint(&["project", "../admin"]);
        assert_eq!(url.path(), "/rest/api/3/project/..%2Fadmin");
    }
}
