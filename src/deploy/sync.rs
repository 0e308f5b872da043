//! Backend origin synchronization for an already-mapped service.

use tracing::info;

use crate::api::retry::call_with_retry;
use crate::api::ApiClient;
use crate::config::Settings;
use crate::error::DeployError;

const SYNC: &str = "backend sync";

/// Push the CDN service's origin backends into the edge deployment.
pub async fn sync_backends(
    client: &ApiClient,
    settings: &Settings,
    site: &str,
    service_id: &str,
) -> Result<(), DeployError> {
    let policy = settings.retry_policy();
    let response = call_with_retry(&policy, SYNC, || client.sync_backends(site, service_id))
        .await
        .map_err(|e| super::transport_error(SYNC, site, e))?;

    if response.is_ok() {
        info!(site, service_id, "origin backends synchronized");
        return Ok(());
    }

    Err(DeployError::Remote {
        stage: SYNC,
        site: site.to_string(),
        status: response.status.as_u16(),
        message: response.message(),
    })
}
