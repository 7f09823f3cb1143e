//! HTTP access to actuator endpoints
//!
//! One GET per call, no retries: a failed poll is simply skipped until the
//! next period.

use springbeat_core::{ApplicationInfo, DecodeError, HealthStatus, Normalized};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const METRICS_PATH: &str = "/metrics";
pub const HEALTH_PATH: &str = "/health";
pub const INFO_PATH: &str = "/info";

/// Connection-level or HTTP status failure
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("undecodable body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: DecodeError,
    },
}

/// Base URL with a single trailing `/` trimmed, followed by `path`
pub fn endpoint_url(base: &str, path: &str) -> String {
    let base = base.strip_suffix('/').unwrap_or(base);
    format!("{base}{path}")
}

pub fn build_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("springbeat/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Actuator endpoints of one monitored application
#[derive(Debug, Clone)]
pub struct ActuatorClient {
    http: reqwest::Client,
    base_url: String,
}

impl ActuatorClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `<base><path>` and return the body of a 2xx answer
    pub async fn fetch(&self, path: &str) -> Result<Vec<u8>, TransportError> {
        let url = endpoint_url(&self.base_url, path);
        debug!("GET {}", url);

        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(source) => return Err(TransportError::Request { url, source }),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status { url, status });
        }

        match response.bytes().await {
            Ok(body) => Ok(body.to_vec()),
            Err(source) => Err(TransportError::Request { url, source }),
        }
    }

    pub async fn metrics(&self) -> Result<Normalized, FetchError> {
        self.fetch_decoded(METRICS_PATH, springbeat_core::normalize).await
    }

    pub async fn health(&self) -> Result<HealthStatus, FetchError> {
        self.fetch_decoded(HEALTH_PATH, springbeat_core::decode_health).await
    }

    pub async fn app_info(&self) -> Result<ApplicationInfo, FetchError> {
        self.fetch_decoded(INFO_PATH, springbeat_core::decode_app_info).await
    }

    async fn fetch_decoded<T>(
        &self,
        path: &str,
        decode: fn(&[u8]) -> Result<T, DecodeError>,
    ) -> Result<T, FetchError> {
        let body = self.fetch(path).await?;
        decode(&body).map_err(|source| FetchError::Decode {
            url: endpoint_url(&self.base_url, path),
            source,
        })
    }
}
