//! Relational store probe.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;

use super::{run_probe, Details, InfraProbe};
use crate::error::ProbeError;
use crate::types::InfrastructureHealth;

/// Postgres connection parameters.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Login role.
    pub user: String,
    /// Login password.
    pub password: String,
    /// Database to connect to.
    pub database: String,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "postgres".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            database: "atrium".to_string(),
        }
    }
}

/// Opens one connection, runs `SELECT version()`, and closes it.
#[derive(Debug, Clone)]
pub struct PostgresProbe {
    config: PostgresConfig,
    timeout: Duration,
}

impl PostgresProbe {
    /// Create a probe.
    #[must_use]
    pub fn new(config: PostgresConfig, timeout: Duration) -> Self {
        Self { config, timeout }
    }

    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port)
            .username(&self.config.user)
            .password(&self.config.password)
            .database(&self.config.database)
            .application_name("atrium-gateway-health")
    }

    async fn check(&self) -> Result<Details, ProbeError> {
        let mut conn = PgConnection::connect_with(&self.connect_options())
            .await
            .map_err(ProbeError::connect)?;

        let version = sqlx::query_scalar::<_, String>("SELECT version()")
            .fetch_one(&mut conn)
            .await;
        let closed = conn.close().await;

        let version = version.map_err(ProbeError::check)?;
        closed.map_err(|e| ProbeError::Teardown(e.to_string()))?;

        let mut details = Details::new();
        details.insert("version".to_string(), Value::from(version));
        Ok(details)
    }
}

#[async_trait]
impl InfraProbe for PostgresProbe {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn probe(&self) -> InfrastructureHealth {
        run_probe(self.name(), self.timeout, self.check()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HealthStatus;

    #[tokio::test]
    async fn unreachable_server_is_unhealthy() {
        let config = PostgresConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..PostgresConfig::default()
        };
        let health = PostgresProbe::new(config, Duration::from_secs(2)).probe().await;

        assert_eq!(health.status, HealthStatus::Unhealthy);
        assert!(health.error.unwrap().starts_with("connection failed"));
        assert!(health.details.is_none());
    }
}
