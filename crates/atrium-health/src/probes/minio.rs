//! Object store probe.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{http_client, run_probe, Details, InfraProbe};
use crate::error::ProbeError;
use crate::types::InfrastructureHealth;

/// Liveness endpoint exposed by every `MinIO` node.
const LIVE_PATH: &str = "/minio/health/live";

/// `MinIO` connection parameters.
#[derive(Debug, Clone)]
pub struct MinioConfig {
    /// Server host.
    pub endpoint: String,
    /// Server port.
    pub port: u16,
    /// Use HTTPS.
    pub use_ssl: bool,
}

impl Default for MinioConfig {
    fn default() -> Self {
        Self {
            endpoint: "minio".to_string(),
            port: 9000,
            use_ssl: false,
        }
    }
}

impl MinioConfig {
    /// Base URL of the server.
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.endpoint, self.port)
    }
}

/// Calls the node liveness endpoint.
#[derive(Debug, Clone)]
pub struct MinioProbe {
    config: MinioConfig,
    timeout: Duration,
}

impl MinioProbe {
    /// Create a probe.
    #[must_use]
    pub fn new(config: MinioConfig, timeout: Duration) -> Self {
        Self { config, timeout }
    }

    async fn check(&self) -> Result<Details, ProbeError> {
        let client = http_client(self.timeout)?;
        let base_url = self.config.base_url();
        let response = client
            .get(format!("{base_url}{LIVE_PATH}"))
            .send()
            .await
            .map_err(ProbeError::connect)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status.as_u16()));
        }

        let mut details = Details::new();
        details.insert("endpoint".to_string(), Value::from(base_url));
        Ok(details)
    }
}

#[async_trait]
impl InfraProbe for MinioProbe {
    fn name(&self) -> &'static str {
        "minio"
    }

    async fn probe(&self) -> InfrastructureHealth {
        run_probe(self.name(), self.timeout, self.check()).await
    }
}
