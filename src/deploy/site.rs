//! Idempotent site existence: look the site up by name, create it only
//! when the lookup is the expected-absence signal.

use reqwest::StatusCode;
use tracing::info;

use crate::api::retry::call_with_retry;
use crate::api::types::SitePayload;
use crate::api::ApiClient;
use crate::config::Settings;
use crate::error::DeployError;

const LOOKUP: &str = "site lookup";
const CREATE: &str = "site creation";

/// How the site came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteOutcome {
    Existing,
    Created,
}

/// Guarantee the named site exists in the corp, creating it with the
/// configured default posture when absent.
pub async fn ensure_site(
    client: &ApiClient,
    settings: &Settings,
    site: &str,
) -> Result<SiteOutcome, DeployError> {
    // The lookup's expected-absence responses must reach us, not be
    // retried; anything else on those statuses is still transient.
    let mut lookup_policy = settings.retry_policy();
    for status in &settings.site_lookup.not_found_statuses {
        let Ok(status) = StatusCode::from_u16(*status) else {
            continue;
        };
        for message in &settings.site_lookup.not_found_messages {
            lookup_policy = lookup_policy.halting_on_message(status, message.clone());
        }
    }

    let lookup = call_with_retry(&lookup_policy, LOOKUP, || client.get_site(site))
        .await
        .map_err(|e| super::transport_error(LOOKUP, site, e))?;

    if lookup.is_ok() {
        info!(site, "site already exists");
        return Ok(SiteOutcome::Existing);
    }

    let message = lookup.message();
    if !settings
        .site_lookup
        .is_not_found(lookup.status.as_u16(), &message)
    {
        return Err(DeployError::Remote {
            stage: LOOKUP,
            site: site.to_string(),
            status: lookup.status.as_u16(),
            message,
        });
    }

    info!(site, "site not found, creating");
    let payload = SitePayload::new(site, &settings.site_defaults);
    let create_policy = settings.retry_policy().accepting(StatusCode::CREATED);
    let created = call_with_retry(&create_policy, CREATE, || client.create_site(&payload))
        .await
        .map_err(|e| super::transport_error(CREATE, site, e))?;

    if create_policy.is_success(created.status) {
        info!(site, "site created");
        return Ok(SiteOutcome::Created);
    }

    Err(DeployError::Remote {
        stage: CREATE,
        site: site.to_string(),
        status: created.status.as_u16(),
        message: created.message(),
    })
}
