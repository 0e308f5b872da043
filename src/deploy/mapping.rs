//! Binding the edge deployment to a CDN service.
//!
//! Creation of the edge object is acknowledged before the backend has
//! finished converging, so the bind is preceded by a bounded poll against
//! the deployment resource. When the poll deadline expires we attempt the
//! bind anyway and let the remote answer decide.

use reqwest::StatusCode;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use crate::api::retry::call_with_retry;
use crate::api::types::MappingPayload;
use crate::api::ApiClient;
use crate::config::Settings;
use crate::error::DeployError;

const MAP: &str = "service mapping";

/// Body text the dashboard returns when the bind raced the propagation
/// window. Worth exactly one extra wait-and-retry.
const NOT_YET_COMPLETE: &str = "not yet complete";

/// Map a site's edge deployment to `service_id`. The bind is an idempotent
/// upsert; repeating the same activation and rollout values is safe.
pub async fn map_service(
    client: &ApiClient,
    settings: &Settings,
    site: &str,
    service_id: &str,
    payload: MappingPayload,
    skip_wait: bool,
) -> Result<(), DeployError> {
    if !skip_wait {
        wait_for_propagation(client, settings, site).await;
    }

    info!(site, service_id, "mapping edge deployment to service");
    // The propagation race signal must reach us with retry budget intact;
    // other 400s stay transient.
    let policy = settings
        .retry_policy()
        .halting_on_message(StatusCode::BAD_REQUEST, NOT_YET_COMPLETE);

    let mut response = call_with_retry(&policy, MAP, || {
        client.map_service(site, service_id, &payload)
    })
    .await
    .map_err(|e| super::transport_error(MAP, site, e))?;

    if response.status == StatusCode::BAD_REQUEST && response.message().contains(NOT_YET_COMPLETE) {
        let wait = settings.propagation.mapping_retry_wait();
        warn!(
            site,
            service_id,
            wait_secs = wait.as_secs(),
            "edge deployment not yet complete, retrying mapping once"
        );
        sleep(wait).await;
        response = call_with_retry(&policy, MAP, || {
            client.map_service(site, service_id, &payload)
        })
        .await
        .map_err(|e| super::transport_error(MAP, site, e))?;
    }

    if response.is_ok() {
        info!(site, service_id, "service mapping complete");
        return Ok(());
    }

    Err(DeployError::Remote {
        stage: MAP,
        site: site.to_string(),
        status: response.status.as_u16(),
        message: response.message(),
    })
}

/// Poll the deployment resource until the agent hostname shows up or the
/// configured deadline passes.
async fn wait_for_propagation(client: &ApiClient, settings: &Settings, site: &str) {
    let deadline = Instant::now() + settings.propagation.deadline();
    info!(
        site,
        deadline_secs = settings.propagation.deadline_secs,
        "waiting for edge deployment propagation"
    );

    loop {
        if super::edge::edge_object_ready(client, site).await {
            info!(site, "edge deployment propagated");
            return;
        }
        if Instant::now() >= deadline {
            warn!(site, "propagation deadline passed, attempting the bind anyway");
            return;
        }
        sleep(settings.propagation.poll_interval()).await;
    }
}
