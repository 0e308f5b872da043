//! Authenticated HTTP client for the dashboard API.
//!
//! Routes and auth headers are dictated by the remote API. The client never
//! interprets statuses beyond capturing them; callers decide what a given
//! status means for their step.

use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::debug;

use super::types::{ApiMessage, MappingPayload, SitePayload};
use crate::error::Result;

const USER_HEADER: &str = "x-api-user";
const TOKEN_HEADER: &str = "x-api-token";
const PROVIDER_TOKEN_HEADER: &str = "Fastly-Key";

/// Resolved credentials, read-only for the life of the process.
#[derive(Debug, Clone)]
pub struct Auth {
    pub user_email: String,
    pub api_token: String,
    /// Write-access token for the CDN provider; only required for calls
    /// that touch the provider's service.
    pub provider_token: Option<String>,
}

/// Status and raw body of a dashboard response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Extract the error message from the JSON envelope, falling back to
    /// the raw body when it is not structured.
    pub fn message(&self) -> String {
        match serde_json::from_str::<ApiMessage>(&self.body) {
            Ok(envelope) if !envelope.message.is_empty() => envelope.message,
            _ => self.body.clone(),
        }
    }
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    corp: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, corp: impl Into<String>, auth: Auth) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            corp: corp.into(),
            auth,
        }
    }

    pub fn corp(&self) -> &str {
        &self.corp
    }

    fn site_url(&self, site: &str) -> String {
        format!("{}/corps/{}/sites/{}", self.base_url, self.corp, site)
    }

    fn edge_url(&self, site: &str) -> String {
        format!("{}/edgeDeployment", self.site_url(site))
    }

    /// GET the site resource; 200 means it exists.
    pub async fn get_site(&self, site: &str) -> Result<ApiResponse> {
        let url = self.site_url(site);
        self.execute(self.client.get(&url), false).await
    }

    /// POST a new site into the corp.
    pub async fn create_site(&self, payload: &SitePayload) -> Result<ApiResponse> {
        let url = format!("{}/corps/{}/sites", self.base_url, self.corp);
        self.execute(self.client.post(&url).json(payload), false).await
    }

    /// GET the edge deployment resource for a site.
    pub async fn get_edge_deployment(&self, site: &str) -> Result<ApiResponse> {
        let url = self.edge_url(site);
        self.execute(self.client.get(&url), true).await
    }

    /// PUT to create the edge security object for a site.
    pub async fn create_edge_deployment(&self, site: &str) -> Result<ApiResponse> {
        let url = self.edge_url(site);
        self.execute(self.client.put(&url), false).await
    }

    /// PUT the service mapping, binding the edge deployment to a CDN
    /// service with activation and rollout values.
    pub async fn map_service(
        &self,
        site: &str,
        service_id: &str,
        payload: &MappingPayload,
    ) -> Result<ApiResponse> {
        let url = format!("{}/{}", self.edge_url(site), service_id);
        self.execute(self.client.put(&url).json(payload), true).await
    }

    /// PUT to synchronize origin backends for a mapped service.
    pub async fn sync_backends(&self, site: &str, service_id: &str) -> Result<ApiResponse> {
        let url = format!("{}/{}/backends", self.edge_url(site), service_id);
        self.execute(self.client.put(&url), true).await
    }

    async fn execute(&self, request: RequestBuilder, provider: bool) -> Result<ApiResponse> {
        let mut request = request
            .header("Content-Type", "application/json")
            .header(USER_HEADER, &self.auth.user_email)
            .header(TOKEN_HEADER, &self.auth.api_token);

        if provider {
            if let Some(token) = &self.auth.provider_token {
                request = request.header(PROVIDER_TOKEN_HEADER, token);
            }
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "dashboard response");

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_prefers_json_envelope() {
        let response = ApiResponse {
            status: StatusCode::BAD_REQUEST,
            body: r#"{"message": "Site not found"}"#.into(),
        };
        assert_eq!(response.message(), "Site not found");
    }

    #[test]
    fn message_falls_back_to_raw_body() {
        let response = ApiResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "<html>upstream broke</html>".into(),
        };
        assert_eq!(response.message(), "<html>upstream broke</html>");
    }

    #[test]
    fn message_falls_back_when_envelope_is_empty() {
        let response = ApiResponse {
            status: StatusCode::BAD_REQUEST,
            body: r#"{"other": 1}"#.into(),
        };
        assert_eq!(response.message(), r#"{"other": 1}"#);
    }
}
