//! Message broker management API probe.

use std::time::Duration;

use async_trait::async_trait;

use super::{fetch_json, http_client, pick_strings, run_probe, Details, InfraProbe};
use crate::error::ProbeError;
use crate::types::InfrastructureHealth;

/// `RabbitMQ` management API parameters.
#[derive(Debug, Clone)]
pub struct RabbitMqConfig {
    /// Broker host.
    pub host: String,
    /// Management plugin port.
    pub management_port: u16,
    /// Management user.
    pub user: String,
    /// Management password.
    pub password: String,
}

impl Default for RabbitMqConfig {
    fn default() -> Self {
        Self {
            host: "rabbitmq".to_string(),
            management_port: 15672,
            user: "guest".to_string(),
            password: "guest".to_string(),
        }
    }
}

impl RabbitMqConfig {
    /// URL of the overview endpoint.
    #[must_use]
    pub fn overview_url(&self) -> String {
        format!("http://{}:{}/api/overview", self.host, self.management_port)
    }
}

/// Reads `GET /api/overview` with basic auth.
#[derive(Debug, Clone)]
pub struct RabbitMqProbe {
    config: RabbitMqConfig,
    timeout: Duration,
}

impl RabbitMqProbe {
    /// Create a probe.
    #[must_use]
    pub fn new(config: RabbitMqConfig, timeout: Duration) -> Self {
        Self { config, timeout }
    }

    async fn check(&self) -> Result<Details, ProbeError> {
        let client = http_client(self.timeout)?;
        let request = client
            .get(self.config.overview_url())
            .basic_auth(&self.config.user, Some(&self.config.password));

        let overview = fetch_json(request).await?;
        Ok(pick_strings(
            &overview,
            &[
                ("/rabbitmq_version", "rabbitmqVersion"),
                ("/erlang_version", "erlangVersion"),
                ("/cluster_name", "clusterName"),
            ],
        ))
    }
}

#[async_trait]
impl InfraProbe for RabbitMqProbe {
    fn name(&self) -> &'static str {
        "rabbitmq"
    }

    async fn probe(&self) -> InfrastructureHealth {
        run_probe(self.name(), self.timeout, self.check()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HealthStatus;
    use serde_json::json;
    use wiremock::matchers::{basic_auth, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> RabbitMqConfig {
        let addr = server.address();
        RabbitMqConfig {
            host: addr.ip().to_string(),
            management_port: addr.port(),
            ..RabbitMqConfig::default()
        }
    }

    #[tokio::test]
    async fn reports_overview_details() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/overview"))
            .and(basic_auth("guest", "guest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "rabbitmq_version": "3.12.10",
                "erlang_version": "26.1.2",
                "cluster_name": "rabbit@broker",
                "object_totals": { "queues": 4 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let health = RabbitMqProbe::new(config_for(&server), Duration::from_secs(5))
            .probe()
            .await;

        assert_eq!(health.status, HealthStatus::Healthy);
        let details = health.details.unwrap();
        assert_eq!(details["rabbitmqVersion"], "3.12.10");
        assert_eq!(details["erlangVersion"], "26.1.2");
        assert_eq!(details["clusterName"], "rabbit@broker");
    }

    #[tokio::test]
    async fn rejected_credentials_are_unhealthy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/overview"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let health = RabbitMqProbe::new(config_for(&server), Duration::from_secs(5))
            .probe()
            .await;

        assert_eq!(health.status, HealthStatus::Unhealthy);
        assert_eq!(health.error.as_deref(), Some("unexpected status 401"));
    }

    #[tokio::test]
    async fn malformed_body_is_unhealthy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/overview"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let health = RabbitMqProbe::new(config_for(&server), Duration::from_secs(5))
            .probe()
            .await;

        assert_eq!(health.status, HealthStatus::Unhealthy);
        assert!(health.error.unwrap().starts_with("liveness check failed"));
    }
}
