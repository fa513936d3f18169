#![allow(dead_code)]

use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;
use tracker_provider::clients::TrackerClient;
use tracker_provider::{Provider, ProviderConfig};
use url::Url;
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";

pub fn config(server: &MockServer) -> ProviderConfig {
    ProviderConfig {
        endpoint: Url::parse(&server.uri()).unwrap(),
        email: None,
        api_token: SecretString::from(TOKEN.to_string()),
        timeout: Duration::from_secs(5),
        operation_timeout: None,
        lookup_attempts: 3,
        lookup_interval: Duration::from_millis(10),
        user_agent: "tracker-provider-tests".to_string(),
    }
}

pub fn client(server: &MockServer) -> Arc<TrackerClient> {
    Arc::new(TrackerClient::new(&config(server)).unwrap())
}

pub fn provider(server: &MockServer) -> Provider {
    Provider::configure(config(server)).unwrap()
}
