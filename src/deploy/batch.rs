//! Batch processing of (site, service id) rows from a tabular file.
//!
//! Rows are processed strictly in order and independently; a failed row
//! never blocks the rows after it. Processed rows are echoed to a shadow
//! file which atomically replaces the input once the full pass finishes,
//! so an interrupted run leaves the original file untouched.

use std::io::Write;
use std::path::Path;

use tracing::{info, warn};

use crate::api::ApiClient;
use crate::config::Settings;
use crate::error::Result;

use super::orchestrator::{deploy_site, DeployRequest};
use super::sync;

/// Tally of one batch pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Parse one input row. Rows need at least two comma-separated columns
/// (site name, service id); anything shorter is skipped silently.
pub fn parse_row(line: &str) -> Option<(String, String)> {
    let mut columns = line.split(',').map(str::trim);
    let site = columns.next().filter(|c| !c.is_empty())?;
    let service_id = columns.next().filter(|c| !c.is_empty())?;
    Some((site.to_string(), service_id.to_string()))
}

/// Provision every row in `path`, mapping each site with the given
/// activation and rollout values.
pub async fn provision_from_file(
    client: &ApiClient,
    settings: &Settings,
    path: &Path,
    activate: bool,
    percent: u8,
) -> Result<BatchSummary> {
    run_batch(path, |site, service_id| {
        let request = DeployRequest {
            site,
            service_id,
            activate,
            percent,
        };
        async move {
            let report = deploy_site(client, settings, &request).await;
            report.mapped()
        }
    })
    .await
}

/// Synchronize origin backends for every row in `path`.
pub async fn sync_from_file(
    client: &ApiClient,
    settings: &Settings,
    path: &Path,
) -> Result<BatchSummary> {
    run_batch(path, |site, service_id| async move {
        match sync::sync_backends(client, settings, &site, &service_id).await {
            Ok(()) => true,
            Err(e) => {
                warn!(site = %site, service_id = %service_id, error = %e, "backend sync failed");
                false
            }
        }
    })
    .await
}

async fn run_batch<F, Fut>(path: &Path, mut handle: F) -> Result<BatchSummary>
where
    F: FnMut(String, String) -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let content = std::fs::read_to_string(path)?;

    let shadow_path = path.with_extension("tmp");
    let mut shadow = std::fs::File::create(&shadow_path)?;

    let mut summary = BatchSummary::default();
    for line in content.lines() {
        let Some((site, service_id)) = parse_row(line) else {
            if !line.trim().is_empty() {
                summary.skipped += 1;
            }
            continue;
        };

        summary.processed += 1;
        if handle(site, service_id).await {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
        }

        // Echo the row as processed; the shadow only replaces the input
        // after the whole pass.
        writeln!(shadow, "{line}")?;
    }

    shadow.flush()?;
    drop(shadow);
    std::fs::rename(&shadow_path, path)?;

    info!(
        processed = summary.processed,
        succeeded = summary.succeeded,
        failed = summary.failed,
        skipped = summary.skipped,
        "batch pass finished"
    );
    Ok(summary)
}
