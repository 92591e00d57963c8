use domain::{PayloadError, Resource};
use std::time::Duration;
use thiserror::Error;

/// Why one resource could not be loaded during a fetch round.
///
/// None of these reach the caller of a load: every variant is answered by
/// substituting data for the affected resource.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// The request was rejected or answered with a non-success status.
    #[error("{resource}: request failed: {message}")]
    Network {
        resource: Resource,
        status: Option<u16>,
        message: String,
    },

    /// The per-resource or overall deadline passed first.
    #[error("{resource}: timed out after {after:?}")]
    Timeout { resource: Resource, after: Duration },

    /// The body was not JSON, or not the expected shape.
    #[error("{resource}: malformed payload: {message}")]
    Parse { resource: Resource, message: String },
}

impl LoadError {
    pub fn network(resource: Resource, message: impl Into<String>) -> Self {
        LoadError::Network {
            resource,
            status: None,
            message: message.into(),
        }
    }

    pub fn payload(resource: Resource, error: PayloadError) -> Self {
        LoadError::Parse {
            resource,
            message: error.to_string(),
        }
    }

    pub fn resource(&self) -> Resource {
        match self {
            LoadError::Network { resource, .. }
            | LoadError::Timeout { resource, .. }
            | LoadError::Parse { resource, .. } => *resource,
        }
    }

    /// Short label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::Network { .. } => "network",
            LoadError::Timeout { .. } => "timeout",
            LoadError::Parse { .. } => "parse",
        }
    }
}

/// Configuration problems, reported once at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Fallback(#[from] datastore::FallbackError),
}
