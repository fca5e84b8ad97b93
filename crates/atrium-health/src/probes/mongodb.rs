//! Document store probe.

use std::time::Duration;

use ::mongodb::bson::doc;
use ::mongodb::options::ClientOptions;
use ::mongodb::Client;
use async_trait::async_trait;
use serde_json::Value;

use super::{run_probe, Details, InfraProbe};
use crate::error::ProbeError;
use crate::types::InfrastructureHealth;

/// `MongoDB` connection parameters.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// Connection string.
    pub uri: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://mongodb:27017".to_string(),
        }
    }
}

/// Opens one client, pings `admin`, reads `buildInfo`, and shuts down.
#[derive(Debug, Clone)]
pub struct MongoProbe {
    config: MongoConfig,
    timeout: Duration,
}

impl MongoProbe {
    /// Create a probe.
    #[must_use]
    pub fn new(config: MongoConfig, timeout: Duration) -> Self {
        Self { config, timeout }
    }

    async fn check(&self) -> Result<Details, ProbeError> {
        let mut options = ClientOptions::parse(&self.config.uri)
            .await
            .map_err(ProbeError::connect)?;
        options.app_name = Some("atrium-gateway-health".to_string());
        options.connect_timeout = Some(self.timeout);
        options.server_selection_timeout = Some(self.timeout);
        options.max_pool_size = Some(1);

        let client = Client::with_options(options).map_err(ProbeError::connect)?;

        let result: Result<_, ::mongodb::error::Error> = async {
            let admin = client.database("admin");
            admin.run_command(doc! { "ping": 1 }).await?;
            admin.run_command(doc! { "buildInfo": 1 }).await
        }
        .await;
        client.shutdown().await;

        let info = result.map_err(ProbeError::check)?;
        let mut details = Details::new();
        if let Ok(version) = info.get_str("version") {
            details.insert("version".to_string(), Value::from(version));
        }
        Ok(details)
    }
}

#[async_trait]
impl InfraProbe for MongoProbe {
    fn name(&self) -> &'static str {
        "mongodb"
    }

    async fn probe(&self) -> InfrastructureHealth {
        run_probe(self.name(), self.timeout, self.check()).await
    }
}
