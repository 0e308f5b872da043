//! Configuration validation command.

use std::path::Path;

use crate::cli::output;
use crate::config::Settings;
use crate::error::Result;

/// Validate the configuration file and report credential presence without
/// touching the remote API.
pub fn execute_config(path: &Path) -> Result<()> {
    println!("Checking configuration: {}", path.display());

    if !path.exists() {
        output::warn(&format!(
            "no config file at {}; built-in defaults will be used",
            path.display()
        ));
    }

    let settings = match Settings::load_or_default(path) {
        Ok(settings) => settings,
        Err(e) => {
            output::error(&format!("configuration error: {e}"));
            std::process::exit(1);
        }
    };

    output::ok("configuration is valid");

    output::section("Summary");
    output::key_value("Base URL", &settings.api.base_url);
    output::key_value(
        "Corp",
        settings.api.corp.as_deref().unwrap_or("(not set)"),
    );
    output::key_value("Agent level", &settings.site_defaults.agent_level);
    output::key_value("Max attempts", settings.retry.max_attempts);
    output::key_value("Backoff (s)", settings.retry.backoff_secs);
    output::key_value(
        "Propagation",
        format!(
            "poll {}s, deadline {}s",
            settings.propagation.poll_interval_secs, settings.propagation.deadline_secs
        ),
    );

    output::section("Credentials");
    if settings.credentials.user_email.is_some() {
        output::ok("user email found (EDGEWARD_USER_EMAIL)");
    } else {
        output::warn("no user email; set EDGEWARD_USER_EMAIL or pass --user-email");
    }
    if settings.credentials.api_token.is_some() {
        output::ok("API token found (EDGEWARD_API_TOKEN)");
    } else {
        output::warn("no API token; set EDGEWARD_API_TOKEN or pass --api-token");
    }
    if settings.credentials.provider_token.is_some() {
        output::ok("provider token found (EDGEWARD_PROVIDER_TOKEN)");
    } else {
        output::warn("no provider token; service mapping and sync will lack write access");
    }

    Ok(())
}
