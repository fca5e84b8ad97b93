//! Infrastructure liveness probes.
//!
//! Each probe opens a fresh client scoped to a single call, runs one cheap
//! liveness operation, and releases the client whether or not the operation
//! succeeded. The whole sequence runs under one timeout; when it fires the
//! in-flight future is dropped, which closes anything it had opened.

mod elasticsearch;
mod minio;
mod mongodb;
mod postgres;
mod rabbitmq;
mod redis;

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ProbeError;
use crate::types::InfrastructureHealth;

pub use self::elasticsearch::{ElasticsearchConfig, ElasticsearchProbe};
pub use self::minio::{MinioConfig, MinioProbe};
pub use self::mongodb::{MongoConfig, MongoProbe};
pub use self::postgres::{PostgresConfig, PostgresProbe};
pub use self::rabbitmq::{RabbitMqConfig, RabbitMqProbe};
pub use self::redis::{RedisConfig, RedisProbe};

/// Diagnostic details collected by a successful probe.
pub type Details = Map<String, Value>;

/// A single infrastructure liveness check.
///
/// Implementations never fail; errors are reported through the returned
/// [`InfrastructureHealth`].
#[async_trait]
pub trait InfraProbe: Send + Sync {
    /// Key under which the result appears in the health document.
    fn name(&self) -> &'static str;

    /// Run the probe once.
    async fn probe(&self) -> InfrastructureHealth;
}

/// Connection parameters for every infrastructure dependency.
#[derive(Debug, Clone, Default)]
pub struct InfrastructureConfig {
    /// Relational store.
    pub postgres: PostgresConfig,
    /// Document store.
    pub mongodb: MongoConfig,
    /// Cache.
    pub redis: RedisConfig,
    /// Search engine.
    pub elasticsearch: ElasticsearchConfig,
    /// Object store.
    pub minio: MinioConfig,
    /// Message broker management API.
    pub rabbitmq: RabbitMqConfig,
}

impl InfrastructureConfig {
    /// Build the six probes, each bounded by `timeout`.
    #[must_use]
    pub fn probes(&self, timeout: Duration) -> Vec<Arc<dyn InfraProbe>> {
        vec![
            Arc::new(PostgresProbe::new(self.postgres.clone(), timeout)),
            Arc::new(MongoProbe::new(self.mongodb.clone(), timeout)),
            Arc::new(RedisProbe::new(self.redis.clone(), timeout)),
            Arc::new(ElasticsearchProbe::new(self.elasticsearch.clone(), timeout)),
            Arc::new(MinioProbe::new(self.minio.clone(), timeout)),
            Arc::new(RabbitMqProbe::new(self.rabbitmq.clone(), timeout)),
        ]
    }
}

/// Run `check` under `timeout` and fold the outcome into a health entry.
pub(crate) async fn run_probe<F>(
    name: &'static str,
    timeout: Duration,
    check: F,
) -> InfrastructureHealth
where
    F: Future<Output = Result<Details, ProbeError>>,
{
    let started = Instant::now();
    let result = tokio::time::timeout(timeout, check)
        .await
        .unwrap_or(Err(ProbeError::Timeout(timeout)));
    let elapsed = crate::elapsed_ms(started);

    match result {
        Ok(details) => {
            debug!(probe = name, elapsed_ms = elapsed, "Infrastructure probe succeeded");
            InfrastructureHealth::healthy(elapsed, details)
        }
        Err(e) => {
            warn!(probe = name, error = %e, "Infrastructure probe failed");
            InfrastructureHealth::unhealthy(elapsed, e.to_string())
        }
    }
}

/// Build a reqwest client for a single probe call.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, ProbeError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .map_err(ProbeError::connect)
}

/// Send a request and decode a successful JSON body.
pub(crate) async fn fetch_json(request: reqwest::RequestBuilder) -> Result<Value, ProbeError> {
    let response = request.send().await.map_err(ProbeError::connect)?;
    let status = response.status();
    if !status.is_success() {
        return Err(ProbeError::Status(status.as_u16()));
    }
    response.json().await.map_err(ProbeError::check)
}

/// Copy string fields out of a JSON object into `details`.
///
/// `fields` pairs a JSON pointer with the detail key to store it under.
pub(crate) fn pick_strings(source: &Value, fields: &[(&str, &str)]) -> Details {
    fields
        .iter()
        .filter_map(|(pointer, key)| {
            source
                .pointer(pointer)
                .and_then(Value::as_str)
                .map(|v| ((*key).to_string(), Value::from(v)))
        })
        .collect()
}
