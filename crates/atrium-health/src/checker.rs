//! Backend service liveness checks.
//!
//! A service is healthy if `GET /health` or, failing that, `GET /` answers
//! with a 2xx status. Errors never escape; they become `unhealthy` results.

use std::sync::Arc;
use std::time::{Duration, Instant};

use atrium_core::{ServiceId, ServiceRegistry};
use chrono::Utc;
use tracing::{debug, warn};

use crate::error::HealthError;
use crate::types::{HealthStatus, ServiceHealth};
use crate::uptime::UptimeTracker;

/// Primary liveness path.
pub const HEALTH_PATH: &str = "/health";

/// Fallback liveness path for services without a health endpoint.
pub const FALLBACK_PATH: &str = "/";

/// Default per-attempt probe timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Probes backend services and records healthy observations.
#[derive(Debug, Clone)]
pub struct ServiceChecker {
    client: reqwest::Client,
    registry: Arc<ServiceRegistry>,
    uptime: Arc<UptimeTracker>,
}

impl ServiceChecker {
    /// Create a checker whose attempts each time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        registry: Arc<ServiceRegistry>,
        uptime: Arc<UptimeTracker>,
        timeout: Duration,
    ) -> Result<Self, HealthError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, registry, uptime))
    }

    /// Create a checker with a custom reqwest client.
    #[must_use]
    pub fn with_client(
        client: reqwest::Client,
        registry: Arc<ServiceRegistry>,
        uptime: Arc<UptimeTracker>,
    ) -> Self {
        Self {
            client,
            registry,
            uptime,
        }
    }

    /// The uptime tracker this checker writes to.
    #[must_use]
    pub fn uptime(&self) -> &UptimeTracker {
        &self.uptime
    }

    /// Check whether a service is healthy.
    pub async fn check_service(&self, id: ServiceId) -> bool {
        self.probe_service(id).await.status == HealthStatus::Healthy
    }

    /// Probe a service and build its health entry.
    ///
    /// On success the service's last-healthy time is advanced; on failure
    /// the uptime record is left untouched.
    pub async fn probe_service(&self, id: ServiceId) -> ServiceHealth {
        let started = Instant::now();
        let outcome = self.attempt(id).await;
        let response_time_ms = crate::elapsed_ms(started);
        let now = Utc::now();

        match outcome {
            Ok(()) => {
                self.uptime.record_healthy(id, now);
                let entry = self.uptime.entry(id);
                ServiceHealth {
                    status: HealthStatus::Healthy,
                    response_time_ms,
                    last_checked_at: now,
                    uptime_ms: Some(
                        u64::try_from(self.uptime.uptime(now).as_millis()).unwrap_or(u64::MAX),
                    ),
                    last_healthy_at: entry.last_healthy_time,
                    error: None,
                }
            }
            Err(error) => {
                warn!(service = %id, error = %error, "Service health check failed");
                ServiceHealth {
                    status: HealthStatus::Unhealthy,
                    response_time_ms,
                    last_checked_at: now,
                    uptime_ms: None,
                    last_healthy_at: self.uptime.entry(id).last_healthy_time,
                    error: Some(error),
                }
            }
        }
    }

    async fn attempt(&self, id: ServiceId) -> Result<(), String> {
        let base_url = self.registry.base_url(id);

        let primary = match self.get(&format!("{base_url}{HEALTH_PATH}")).await {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        debug!(
            service = %id,
            error = %primary,
            "Health endpoint failed, falling back to root"
        );

        self.get(&format!("{base_url}{FALLBACK_PATH}"))
            .await
            .map_err(|fallback| format!("{HEALTH_PATH}: {primary}; {FALLBACK_PATH}: {fallback}"))
    }

    async fn get(&self, url: &str) -> Result<(), String> {
        match self.client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => Err(format!("status {}", resp.status())),
            Err(e) => Err(e.to_string()),
        }
    }
}
