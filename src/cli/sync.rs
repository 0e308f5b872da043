//! Handler for the `sync` command.

use crate::api::ApiClient;
use crate::cli::{output, SyncArgs};
use crate::config::Settings;
use crate::deploy;
use crate::error::{ConfigError, Result};

/// Execute the sync command, either for a single site or a batch file.
pub async fn execute(settings: &Settings, args: &SyncArgs) -> Result<()> {
    let corp = settings.require_corp()?.to_string();
    let auth = settings.require_auth()?;
    let client = ApiClient::new(settings.api.base_url.clone(), corp, auth);

    if let Some(file) = &args.file {
        let summary = deploy::batch::sync_from_file(&client, settings, file).await?;

        output::section("Backend sync summary");
        output::key_value("Processed", summary.processed);
        output::key_value("Synced", summary.succeeded);
        output::key_value("Failed", summary.failed);
        output::key_value("Skipped rows", summary.skipped);
        if summary.failed > 0 {
            output::warn("some sites failed to sync; see the log for details");
        } else {
            output::ok("all backends synchronized");
        }
        return Ok(());
    }

    let (site, service_id) = match (&args.site, &args.service_id) {
        (Some(site), Some(service_id)) => (site.clone(), service_id.clone()),
        _ => {
            return Err(ConfigError::MissingField {
                field: "--site and --service-id (or --file)",
            }
            .into())
        }
    };

    deploy::sync::sync_backends(&client, settings, &site, &service_id).await?;
    output::ok(&format!("backends synchronized for {site}"));
    Ok(())
}
