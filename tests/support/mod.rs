//! Shared fixtures for integration tests: settings with zeroed waits and a
//! client pointed at a mock server.

use edgeward::api::{ApiClient, Auth};
use edgeward::config::Settings;

pub const CORP: &str = "acme";

pub fn fast_settings(base_url: &str) -> Settings {
    let mut settings = Settings::default();
    settings.api.base_url = base_url.to_string();
    settings.api.corp = Some(CORP.to_string());
    settings.retry.backoff_secs = 0;
    settings.propagation.poll_interval_secs = 0;
    settings.propagation.deadline_secs = 0;
    settings.propagation.mapping_retry_wait_secs = 0;
    settings
}

pub fn client(base_url: &str) -> ApiClient {
    ApiClient::new(
        base_url,
        CORP,
        Auth {
            user_email: "ops@example.com".into(),
            api_token: "test-api-token".into(),
            provider_token: Some("test-provider-token".into()),
        },
    )
}

/// A provisioned deployment body whose agent hostname matches the corp.
pub fn provisioned_edge_body() -> String {
    format!(
        r#"{{"AgentHostName": "se--{CORP}--x7f3k2.edgecompute.app"}}"#
    )
}

/// The expected-absence body for a missing edge deployment.
pub fn missing_edge_body() -> &'static str {
    r#"{"message": "edge deployment missing"}"#
}
