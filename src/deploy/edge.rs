//! Edge security object provisioning and the existence probe.

use regex::Regex;
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::api::retry::call_with_retry;
use crate::api::types::EdgeDeployment;
use crate::api::{ApiClient, ApiResponse};
use crate::config::Settings;
use crate::error::DeployError;

const PROBE: &str = "edge object probe";
const CREATE: &str = "edge object creation";

/// True when the deployment's agent hostname matches the pattern of a
/// provisioned corp deployment.
pub fn agent_hostname_matches(corp: &str, agent_host_name: &str) -> bool {
    let pattern = format!(
        r"se--{}--[a-z0-9]+\.edgecompute\.app",
        regex::escape(corp)
    );
    Regex::new(&pattern)
        .expect("escaped corp name always forms a valid pattern")
        .is_match(agent_host_name)
}

fn probe_hit(client: &ApiClient, response: &ApiResponse) -> bool {
    if !response.is_ok() {
        return false;
    }
    match serde_json::from_str::<EdgeDeployment>(&response.body) {
        Ok(deployment) => agent_hostname_matches(client.corp(), &deployment.agent_host_name),
        Err(_) => false,
    }
}

/// Check whether the edge security object is already provisioned.
///
/// This is an optimization: a positive answer lets the orchestrator skip
/// creation and the propagation wait. Anything ambiguous (a 404, an
/// unexpected status, an unparseable body, a dead connection) reads as
/// "absent" and the full provisioning path runs.
pub async fn edge_object_exists(client: &ApiClient, settings: &Settings, site: &str) -> bool {
    // Absence is the common answer here; it must not burn retry budget.
    let policy = settings
        .retry_policy()
        .halting_on(StatusCode::NOT_FOUND)
        .halting_on(StatusCode::BAD_REQUEST);

    let response = match call_with_retry(&policy, PROBE, || client.get_edge_deployment(site)).await
    {
        Ok(response) => response,
        Err(e) => {
            warn!(site, error = %e, "edge object probe failed, assuming absent");
            return false;
        }
    };

    if probe_hit(client, &response) {
        info!(site, "edge security object already provisioned");
        return true;
    }

    debug!(
        site,
        status = response.status.as_u16(),
        "edge security object not present"
    );
    false
}

/// One poll tick against the edge deployment resource, used while waiting
/// for backend propagation. A single GET, no retry wrapper; the poll loop
/// is its own retry.
pub async fn edge_object_ready(client: &ApiClient, site: &str) -> bool {
    match client.get_edge_deployment(site).await {
        Ok(response) => probe_hit(client, &response),
        Err(_) => false,
    }
}

/// Create the edge security object for a site. Idempotent at the remote
/// system's discretion; the orchestrator avoids duplicate calls via the
/// probe above.
pub async fn create_edge_object(
    client: &ApiClient,
    settings: &Settings,
    site: &str,
) -> Result<(), DeployError> {
    info!(site, "creating edge security object");
    let policy = settings.retry_policy();
    let response = call_with_retry(&policy, CREATE, || client.create_edge_deployment(site))
        .await
        .map_err(|e| super::transport_error(CREATE, site, e))?;

    if response.is_ok() {
        return Ok(());
    }

    Err(DeployError::Remote {
        stage: CREATE,
        site: site.to_string(),
        status: response.status.as_u16(),
        message: response.message(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_pattern_is_anchored_to_the_corp() {
        assert!(agent_hostname_matches(
            "acme",
            "se--acme--x7f3k2.edgecompute.app"
        ));
        assert!(!agent_hostname_matches(
            "acme",
            "se--other--x7f3k2.edgecompute.app"
        ));
        assert!(!agent_hostname_matches("acme", ""));
        assert!(!agent_hostname_matches("acme", "acme.example.com"));
    }

    #[test]
    fn corp_names_are_escaped_before_matching() {
        // A corp name with regex metacharacters must not panic or
        // over-match.
        assert!(!agent_hostname_matches(
            "a.b",
            "se--axb--k9.edgecompute.app"
        ));
        assert!(agent_hostname_matches("a.b", "se--a.b--k9.edgecompute.app"));
    }
}
