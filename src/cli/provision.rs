//! Handler for the `provision` command.

use crate::api::ApiClient;
use crate::cli::{output, ProvisionArgs};
use crate::config::Settings;
use crate::deploy::{self, DeployRequest};
use crate::error::{ConfigError, Result};

/// Execute the provision command, either for a single site or a batch file.
pub async fn execute(settings: &Settings, args: &ProvisionArgs) -> Result<()> {
    let corp = settings.require_corp()?.to_string();
    let auth = settings.require_auth()?;
    let client = ApiClient::new(settings.api.base_url.clone(), corp, auth);

    if let Some(file) = &args.file {
        let summary =
            deploy::batch::provision_from_file(&client, settings, file, args.activate, args.percent)
                .await?;

        output::section("Batch provisioning summary");
        output::key_value("Processed", summary.processed);
        output::key_value("Mapped", summary.succeeded);
        output::key_value("Aborted", summary.failed);
        output::key_value("Skipped rows", summary.skipped);
        if summary.failed > 0 {
            output::warn("some sites aborted; see the log for details");
        } else {
            output::ok("all sites mapped");
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

    let request = DeployRequest {
        site,
        service_id,
        activate: args.activate,
        percent: args.percent,
    };
    let report = deploy::deploy_site(&client, settings, &request).await;

    if let Some(e) = report.error {
        output::error(&format!(
            "deployment of {} aborted after stage '{}'",
            report.site,
            report.stage.as_str()
        ));
        return Err(e.into());
    }

    output::ok(&format!(
        "{} mapped to service {}",
        report.site, report.service_id
    ));
    Ok(())
}
