//! Per-site deployment sequencing.
//!
//! Stages advance `Start → SiteEnsured → EdgeProvisioned → Mapped`; the
//! first failure aborts the site with the stage it had reached. Retries
//! happen only inside individual remote calls, never across stages.

use tracing::{error, info};

use crate::api::types::MappingPayload;
use crate::api::ApiClient;
use crate::config::Settings;
use crate::error::DeployError;

use super::{edge, mapping, site};

/// What to deploy for one site.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub site: String,
    pub service_id: String,
    pub activate: bool,
    pub percent: u8,
}

/// Last stage a site's pipeline completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeployStage {
    Start,
    SiteEnsured,
    EdgeProvisioned,
    Mapped,
}

impl DeployStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployStage::Start => "start",
            DeployStage::SiteEnsured => "site ensured",
            DeployStage::EdgeProvisioned => "edge provisioned",
            DeployStage::Mapped => "mapped",
        }
    }
}

/// Outcome of one site's pipeline. `error` is set when the site aborted
/// at `stage`.
#[derive(Debug)]
pub struct DeployReport {
    pub site: String,
    pub service_id: String,
    pub stage: DeployStage,
    pub error: Option<DeployError>,
}

impl DeployReport {
    pub fn mapped(&self) -> bool {
        self.stage == DeployStage::Mapped && self.error.is_none()
    }

    fn aborted(request: &DeployRequest, stage: DeployStage, error: DeployError) -> Self {
        error!(
            site = %request.site,
            stage = stage.as_str(),
            error = %error,
            "site deployment aborted"
        );
        Self {
            site: request.site.clone(),
            service_id: request.service_id.clone(),
            stage,
            error: Some(error),
        }
    }
}

/// Run the full pipeline for one site. Failures are reported, not
/// propagated, so batch callers can keep going.
pub async fn deploy_site(
    client: &ApiClient,
    settings: &Settings,
    request: &DeployRequest,
) -> DeployReport {
    let mut stage = DeployStage::Start;

    // When the edge object is already provisioned the site necessarily
    // exists too, so both ensure steps and the propagation wait are skipped.
    let skip_wait = edge::edge_object_exists(client, settings, &request.site).await;
    if skip_wait {
        info!(site = %request.site, "skipping provisioning, edge object present");
        stage = DeployStage::EdgeProvisioned;
    }

    if !skip_wait {
        match site::ensure_site(client, settings, &request.site).await {
            Ok(_) => stage = DeployStage::SiteEnsured,
            Err(e) => return DeployReport::aborted(request, stage, e),
        }

        match edge::create_edge_object(client, settings, &request.site).await {
            Ok(()) => stage = DeployStage::EdgeProvisioned,
            Err(e) => return DeployReport::aborted(request, stage, e),
        }
    }

    let payload = MappingPayload {
        activate_version: request.activate,
        percent_enabled: request.percent,
    };
    match mapping::map_service(
        client,
        settings,
        &request.site,
        &request.service_id,
        payload,
        skip_wait,
    )
    .await
    {
        Ok(()) => stage = DeployStage::Mapped,
        Err(e) => return DeployReport::aborted(request, stage, e),
    }

    info!(
        site = %request.site,
        service_id = %request.service_id,
        "site deployment complete"
    );
    DeployReport {
        site: request.site.clone(),
        service_id: request.service_id.clone(),
        stage,
        error: None,
    }
}
