use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failures surfaced by a single site's deployment pipeline.
///
/// A `DeployError` aborts the current site only; batch processing moves on
/// to the next row.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("{stage} for site '{site}' returned status {status}: {message}")]
    Remote {
        stage: &'static str,
        site: String,
        status: u16,
        message: String,
    },

    #[error("{stage} for site '{site}' failed: {source}")]
    Transport {
        stage: &'static str,
        site: String,
        #[source]
        source: reqwest::Error,
    },
}

impl DeployError {
    pub fn stage(&self) -> &'static str {
        match self {
            DeployError::Remote { stage, .. } => stage,
            DeployError::Transport { stage, .. } => stage,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            DeployError::Remote { status, .. } => Some(*status),
            DeployError::Transport { .. } => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
