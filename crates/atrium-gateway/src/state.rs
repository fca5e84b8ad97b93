//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers.

use std::sync::Arc;

use atrium_health::{HealthAggregator, ServiceChecker, UptimeTracker};

use crate::config::GatewayConfig;
use crate::error::StartupError;
use crate::proxy::Forwarder;

/// Shared application state for the gateway.
///
/// Built once at startup; the service registry inside is shared by the
/// forwarder and the health checker and never changes afterwards.
pub struct GatewayState {
    /// Gateway configuration.
    pub config: GatewayConfig,
    /// Request forwarder.
    pub forwarder: Forwarder,
    /// Health aggregator.
    pub health: HealthAggregator,
}

impl GatewayState {
    /// Create a new gateway state.
    #[must_use]
    pub fn new(config: GatewayConfig, forwarder: Forwarder, health: HealthAggregator) -> Self {
        Self {
            config,
            forwarder,
            health,
        }
    }

    /// Wire the registry, uptime tracker, checker, probes, and forwarder
    /// from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be created.
    pub fn from_config(config: GatewayConfig) -> Result<Self, StartupError> {
        let registry = Arc::new(config.services.registry());
        let uptime = Arc::new(UptimeTracker::new());

        let checker = Arc::new(ServiceChecker::new(
            Arc::clone(&registry),
            uptime,
            config.health_probe_timeout(),
        )?);
        let probes = config
            .infrastructure
            .probes(config.health_probe_timeout());
        let health = HealthAggregator::new(checker, probes);

        let forwarder = Forwarder::new(
            registry,
            config.proxy_timeout(),
            config.proxy_max_redirects,
        )?;

        Ok(Self::new(config, forwarder, health))
    }
}
