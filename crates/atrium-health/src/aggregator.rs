//! Health aggregation.
//!
//! One aggregation cycle probes every service and every infrastructure
//! dependency concurrently and folds the results into a [`HealthDocument`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use atrium_core::ServiceId;
use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, error};

use crate::checker::ServiceChecker;
use crate::probes::InfraProbe;
use crate::types::{HealthDocument, HealthStatus, InfrastructureHealth, ServiceHealth};

/// Runs all health checks and assembles the health document.
pub struct HealthAggregator {
    checker: Arc<ServiceChecker>,
    probes: Vec<Arc<dyn InfraProbe>>,
    started: Instant,
}

impl HealthAggregator {
    /// Create an aggregator. Process uptime is measured from this call.
    #[must_use]
    pub fn new(checker: Arc<ServiceChecker>, probes: Vec<Arc<dyn InfraProbe>>) -> Self {
        Self {
            checker,
            probes,
            started: Instant::now(),
        }
    }

    /// Probe everything and build the health document.
    ///
    /// Each check runs as its own task, so a slow target only delays the
    /// document, never another check. Tasks are not cancelled if the caller
    /// goes away; they finish and release their connections.
    pub async fn health_status(&self) -> HealthDocument {
        let (services, infrastructure) =
            tokio::join!(self.check_services(), self.check_infrastructure());

        let status = overall_status(
            services
                .values()
                .map(|s| s.status)
                .chain(infrastructure.values().map(|i| i.status)),
        );

        debug!(
            status = ?status,
            services = services.len(),
            infrastructure = infrastructure.len(),
            "Health aggregation complete"
        );

        HealthDocument {
            status,
            timestamp: Utc::now(),
            process_uptime_ms: crate::elapsed_ms(self.started),
            services,
            infrastructure,
        }
    }

    async fn check_services(&self) -> BTreeMap<ServiceId, ServiceHealth> {
        let handles = ServiceId::ALL.map(|id| {
            let checker = Arc::clone(&self.checker);
            tokio::spawn(async move { checker.probe_service(id).await })
        });

        ServiceId::ALL
            .into_iter()
            .zip(join_all(handles).await)
            .map(|(id, joined)| {
                let health = joined.unwrap_or_else(|e| {
                    error!(service = %id, error = %e, "Service health task failed");
                    ServiceHealth::failed(format!("health check task failed: {e}"))
                });
                (id, health)
            })
            .collect()
    }

    async fn check_infrastructure(&self) -> BTreeMap<String, InfrastructureHealth> {
        let handles: Vec<_> = self
            .probes
            .iter()
            .map(|probe| {
                let probe = Arc::clone(probe);
                tokio::spawn(async move { probe.probe().await })
            })
            .collect();

        self.probes
            .iter()
            .zip(join_all(handles).await)
            .map(|(probe, joined)| {
                let health = joined.unwrap_or_else(|e| {
                    error!(probe = probe.name(), error = %e, "Infrastructure probe task failed");
                    InfrastructureHealth::unhealthy(0, format!("probe task failed: {e}"))
                });
                (probe.name().to_string(), health)
            })
            .collect()
    }
}

/// `unhealthy` if any status is unhealthy, otherwise `healthy`.
///
/// [`HealthStatus::Degraded`] is reserved and never produced here.
#[must_use]
pub fn overall_status(statuses: impl IntoIterator<Item = HealthStatus>) -> HealthStatus {
    if statuses.into_iter().any(HealthStatus::is_unhealthy) {
        HealthStatus::Unhealthy
    } else {
        HealthStatus::Healthy
    }
}
