//! Edgeward - onboarding sites into an edge security service.
//!
//! The pipeline per site is three dependent remote calls against the
//! dashboard API, separated by propagation waits:
//!
//! 1. ensure the site resource exists (create-on-absent),
//! 2. ensure the edge security object exists,
//! 3. map the deployment to a CDN service with activation and rollout
//!    values.
//!
//! Each call runs under a bounded retry policy; failures abort only the
//! current site, which is what lets batch runs keep going row by row.
//!
//! # Modules
//!
//! - [`config`] - Settings from TOML with environment overrides
//! - [`api`] - Authenticated dashboard client and the retry wrapper
//! - [`deploy`] - Site onboarding pipeline and batch runner
//! - [`cli`] - Command-line surface
//! - [`error`] - Error types for the crate

pub mod api;
pub mod cli;
pub mod config;
pub mod deploy;
pub mod error;
