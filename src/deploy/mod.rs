//! Site onboarding pipeline.
//!
//! Per site the orchestrator ensures the site resource exists, ensures the
//! edge security object exists, waits for backend propagation, then maps
//! the deployment to a CDN service. Steps run strictly in sequence; a
//! failed step aborts the current site only.

pub mod batch;
pub mod edge;
pub mod mapping;
pub mod orchestrator;
pub mod site;
pub mod sync;

pub use batch::BatchSummary;
pub use orchestrator::{deploy_site, DeployRequest, DeployReport, DeployStage};

use crate::error::{DeployError, Error};

/// Convert a wrapper-level failure into a per-site deploy error.
pub(crate) fn transport_error(stage: &'static str, site: &str, error: Error) -> DeployError {
    match error {
        Error::Http(source) => DeployError::Transport {
            stage,
            site: site.to_string(),
            source,
        },
        other => DeployError::Remote {
            stage,
            site: site.to_string(),
            status: 0,
            message: other.to_string(),
        },
    }
}
