//! Search engine probe.

use std::time::Duration;

use async_trait::async_trait;

use super::{fetch_json, http_client, pick_strings, run_probe, Details, InfraProbe};
use crate::error::ProbeError;
use crate::types::InfrastructureHealth;

/// Elasticsearch connection parameters.
#[derive(Debug, Clone)]
pub struct ElasticsearchConfig {
    /// Base URL of the cluster.
    pub url: String,
    /// Optional basic-auth user.
    pub username: Option<String>,
    /// Optional basic-auth password.
    pub password: Option<String>,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: "http://elasticsearch:9200".to_string(),
            username: None,
            password: None,
        }
    }
}

/// Reads the cluster info document at `GET /`.
#[derive(Debug, Clone)]
pub struct ElasticsearchProbe {
    config: ElasticsearchConfig,
    timeout: Duration,
}

impl ElasticsearchProbe {
    /// Create a probe.
    #[must_use]
    pub fn new(config: ElasticsearchConfig, timeout: Duration) -> Self {
        Self { config, timeout }
    }

    async fn check(&self) -> Result<Details, ProbeError> {
        let client = http_client(self.timeout)?;
        let mut request = client.get(self.config.url.trim_end_matches('/'));
        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_deref());
        }

        let info = fetch_json(request).await?;
        Ok(pick_strings(
            &info,
            &[
                ("/cluster_name", "clusterName"),
                ("/version/number", "version"),
            ],
        ))
    }
}

#[async_trait]
impl InfraProbe for ElasticsearchProbe {
    fn name(&self) -> &'static str {
        "elasticsearch"
    }

    async fn probe(&self) -> InfrastructureHealth {
        run_probe(self.name(), self.timeout, self.check()).await
    }
}
