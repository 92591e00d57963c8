use crate::error::{ConfigError, LoadError};
use domain::Resource;
use futures::future::BoxFuture;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

/// Backend that hands out the raw JSON document of a resource.
/// This allows switching between a web host and a local checkout of the
/// collection job's output.
pub trait ResourceSource: Send + Sync {
    /// Fetch the document stored at `path` for `resource`
    fn fetch<'a>(&'a self, resource: Resource, path: &'a str) -> BoxFuture<'a, Result<Value, LoadError>>;

    /// Where documents come from, for logs
    fn describe(&self) -> String;
}

/// Fetches documents over HTTP GET, bypassing caches
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        let path = path.trim_start_matches("./").trim_start_matches('/');
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl ResourceSource for HttpSource {
    fn fetch<'a>(&'a self, resource: Resource, path: &'a str) -> BoxFuture<'a, Result<Value, LoadError>> {
        Box::pin(async move {
            let url = self.url_for(path);
            debug!(%resource, %url, "fetching resource");

            let response = self
                .client
                .get(&url)
                .header(CACHE_CONTROL, "no-cache")
                .header(PRAGMA, "no-cache")
                .send()
                .await
                .map_err(|e| LoadError::network(resource, e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(LoadError::Network {
                    resource,
                    status: Some(status.as_u16()),
                    message: format!("HTTP {status}"),
                });
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| LoadError::network(resource, e.to_string()))?;
            serde_json::from_slice(&body).map_err(|e| LoadError::Parse {
                resource,
                message: e.to_string(),
            })
        })
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Reads documents from a directory, e.g. a checkout of the site
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceSource for DirectorySource {
    fn fetch<'a>(&'a self, resource: Resource, path: &'a str) -> BoxFuture<'a, Result<Value, LoadError>> {
        Box::pin(async move {
            let file = self.root.join(path.trim_start_matches("./"));
            debug!(%resource, file = %file.display(), "reading resource");

            let bytes = tokio::fs::read(&file)
                .await
                .map_err(|e| LoadError::network(resource, format!("{}: {e}", file.display())))?;
            serde_json::from_slice(&bytes).map_err(|e| LoadError::Parse {
                resource,
                message: e.to_string(),
            })
        })
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}
