//! Settings loading and validation.
//!
//! Settings come from a TOML file with environment variable overrides for
//! credentials (`EDGEWARD_USER_EMAIL`, `EDGEWARD_API_TOKEN`,
//! `EDGEWARD_PROVIDER_TOKEN`, `EDGEWARD_CORP`). Tokens are never read from
//! the config file.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

use crate::api::retry::RetryPolicy;
use crate::api::Auth;
use crate::error::{ConfigError, Result};

pub const DEFAULT_BASE_URL: &str = "https://dashboard.signalsciences.net/api/v0";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub propagation: PropagationSettings,
    #[serde(default)]
    pub site_defaults: SiteDefaults,
    #[serde(default)]
    pub site_lookup: SiteLookupPolicy,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Credentials are loaded from the environment at runtime, never from
    /// the config file.
    #[serde(skip)]
    pub credentials: CredentialSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Tenant namespace; may also come from `EDGEWARD_CORP` or `--corp`.
    #[serde(default)]
    pub corp: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            corp: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CredentialSettings {
    pub user_email: Option<String>,
    pub api_token: Option<String>,
    pub provider_token: Option<String>,
}

impl CredentialSettings {
    fn from_env() -> Self {
        Self {
            user_email: std::env::var("EDGEWARD_USER_EMAIL").ok(),
            api_token: std::env::var("EDGEWARD_API_TOKEN").ok(),
            provider_token: std::env::var("EDGEWARD_PROVIDER_TOKEN").ok(),
        }
    }
}

/// Retry behavior for individual remote calls.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_backoff_secs() -> u64 {
    10
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_secs: default_backoff_secs(),
        }
    }
}

/// Bounded polling for asynchronous backend convergence after edge object
/// creation, plus the one-shot wait when a mapping call reports the
/// deployment is not yet complete.
#[derive(Debug, Clone, Deserialize)]
pub struct PropagationSettings {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    #[serde(default = "default_mapping_retry_wait_secs")]
    pub mapping_retry_wait_secs: u64,
}

const fn default_poll_interval_secs() -> u64 {
    10
}

const fn default_deadline_secs() -> u64 {
    90
}

const fn default_mapping_retry_wait_secs() -> u64 {
    10
}

impl Default for PropagationSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            deadline_secs: default_deadline_secs(),
            mapping_retry_wait_secs: default_mapping_retry_wait_secs(),
        }
    }
}

impl PropagationSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    pub fn mapping_retry_wait(&self) -> Duration {
        Duration::from_secs(self.mapping_retry_wait_secs)
    }
}

/// Security posture applied to newly created sites.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteDefaults {
    /// "log" observes traffic without blocking; "block" enforces.
    #[serde(default = "default_agent_level")]
    pub agent_level: String,
    #[serde(default = "default_block_http_code")]
    pub block_http_code: u16,
    #[serde(default = "default_block_duration_seconds")]
    pub block_duration_seconds: u64,
    #[serde(default)]
    pub block_redirect_url: String,
}

fn default_agent_level() -> String {
    "log".into()
}

const fn default_block_http_code() -> u16 {
    406
}

const fn default_block_duration_seconds() -> u64 {
    86400
}

impl Default for SiteDefaults {
    fn default() -> Self {
        Self {
            agent_level: default_agent_level(),
            block_http_code: default_block_http_code(),
            block_duration_seconds: default_block_duration_seconds(),
            block_redirect_url: String::new(),
        }
    }
}

/// Which lookup responses mean "site absent, go create it". The dashboard
/// has answered with both 400 and 404 over time, so the set is explicit
/// rather than hard-coded.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteLookupPolicy {
    #[serde(default = "default_not_found_statuses")]
    pub not_found_statuses: Vec<u16>,
    #[serde(default = "default_not_found_messages")]
    pub not_found_messages: Vec<String>,
}

fn default_not_found_statuses() -> Vec<u16> {
    vec![400, 404]
}

fn default_not_found_messages() -> Vec<String> {
    vec!["Site not found".into(), "Invalid resource request".into()]
}

impl Default for SiteLookupPolicy {
    fn default() -> Self {
        Self {
            not_found_statuses: default_not_found_statuses(),
            not_found_messages: default_not_found_messages(),
        }
    }
}

impl SiteLookupPolicy {
    /// True when a lookup response is the expected-absence signal rather
    /// than a real error.
    pub fn is_not_found(&self, status: u16, message: &str) -> bool {
        self.not_found_statuses.contains(&status)
            && self.not_found_messages.iter().any(|m| m == message)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;

        let mut settings: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;
        settings.apply_env();
        settings.validate()?;

        Ok(settings)
    }

    /// Load from `path` when it exists; otherwise fall back to defaults.
    /// Credentials still come from the environment either way.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            let mut settings = Self::default();
            settings.apply_env();
            settings.validate()?;
            Ok(settings)
        }
    }

    fn apply_env(&mut self) {
        self.credentials = CredentialSettings::from_env();
        if let Ok(corp) = std::env::var("EDGEWARD_CORP") {
            self.api.corp = Some(corp);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            return Err(ConfigError::MissingField { field: "api.base_url" }.into());
        }
        if !matches!(self.site_defaults.agent_level.as_str(), "log" | "block") {
            return Err(ConfigError::InvalidValue {
                field: "site_defaults.agent_level",
                reason: format!(
                    "expected \"log\" or \"block\", got \"{}\"",
                    self.site_defaults.agent_level
                ),
            }
            .into());
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_attempts",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Retry policy for ordinary remote calls.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_secs(self.retry.backoff_secs),
        )
    }

    /// Resolved tenant name, erroring when nothing supplied it.
    pub fn require_corp(&self) -> Result<&str> {
        self.api
            .corp
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ConfigError::MissingField { field: "corp" }.into())
    }

    /// Concrete credentials for the API client, erroring on anything missing.
    pub fn require_auth(&self) -> Result<Auth> {
        let user_email = self
            .credentials
            .user_email
            .clone()
            .ok_or(ConfigError::MissingField { field: "user_email" })?;
        let api_token = self
            .credentials
            .api_token
            .clone()
            .ok_or(ConfigError::MissingField { field: "api_token" })?;
        Ok(Auth {
            user_email,
            api_token,
            provider_token: self.credentials.provider_token.clone(),
        })
    }

    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}
