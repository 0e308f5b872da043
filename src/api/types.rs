//! Request and response bodies for the dashboard API.

use serde::{Deserialize, Serialize};

use crate::config::SiteDefaults;

/// Body for site creation. Field names are dictated by the remote API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SitePayload {
    pub name: String,
    pub display_name: String,
    pub agent_level: String,
    #[serde(rename = "blockHTTPCode")]
    pub block_http_code: u16,
    pub block_duration_seconds: u64,
    #[serde(rename = "blockRedirectURL")]
    pub block_redirect_url: String,
}

impl SitePayload {
    /// Site creation payload: display name mirrors the site name, the rest
    /// comes from the configured defaults.
    pub fn new(site_name: &str, defaults: &SiteDefaults) -> Self {
        Self {
            name: site_name.to_string(),
            display_name: site_name.to_string(),
            agent_level: defaults.agent_level.clone(),
            block_http_code: defaults.block_http_code,
            block_duration_seconds: defaults.block_duration_seconds,
            block_redirect_url: defaults.block_redirect_url.clone(),
        }
    }
}

/// Body for mapping an edge deployment to a CDN service. Repeating the same
/// values is a safe upsert on the remote side.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingPayload {
    pub activate_version: bool,
    pub percent_enabled: u8,
}

/// The error envelope most dashboard responses carry.
#[derive(Debug, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: String,
}

/// Subset of the edge deployment resource we inspect.
#[derive(Debug, Deserialize)]
pub struct EdgeDeployment {
    #[serde(rename = "AgentHostName", default)]
    pub agent_host_name: String,
}
