//! Health document types.
//!
//! These are serialized as the body of `GET /internal/health`.

use std::collections::BTreeMap;

use atrium_core::ServiceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Liveness verdict for a single target or the whole platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// The target answered its liveness check.
    Healthy,
    /// The target failed, timed out, or could not be reached.
    Unhealthy,
    /// Reserved. The aggregator never produces this value.
    Degraded,
}

impl HealthStatus {
    /// Whether this is [`HealthStatus::Unhealthy`].
    #[must_use]
    pub const fn is_unhealthy(self) -> bool {
        matches!(self, Self::Unhealthy)
    }
}

/// Health of one backend service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    /// Probe verdict.
    pub status: HealthStatus,
    /// Wall time spent probing, fallback included.
    pub response_time_ms: u64,
    /// When the probe finished.
    pub last_checked_at: DateTime<Utc>,
    /// Time since the uptime tracker started. Present only when healthy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime_ms: Option<u64>,
    /// Last time the service was observed healthy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_healthy_at: Option<DateTime<Utc>>,
    /// Failure detail when unhealthy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceHealth {
    /// An unhealthy entry for a probe that never produced a result.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            response_time_ms: 0,
            last_checked_at: Utc::now(),
            uptime_ms: None,
            last_healthy_at: None,
            error: Some(error.into()),
        }
    }
}

/// Health of one infrastructure dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureHealth {
    /// Probe verdict.
    pub status: HealthStatus,
    /// Wall time spent on connect, check, and teardown.
    pub response_time_ms: u64,
    /// When the probe finished.
    pub last_checked_at: DateTime<Utc>,
    /// Failure detail when unhealthy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Cheap diagnostics such as server version or uptime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

impl InfrastructureHealth {
    /// A healthy entry. Empty details are omitted.
    #[must_use]
    pub fn healthy(response_time_ms: u64, details: Map<String, Value>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            response_time_ms,
            last_checked_at: Utc::now(),
            error: None,
            details: (!details.is_empty()).then_some(details),
        }
    }

    /// An unhealthy entry.
    #[must_use]
    pub fn unhealthy(response_time_ms: u64, error: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            response_time_ms,
            last_checked_at: Utc::now(),
            error: Some(error.into()),
            details: None,
        }
    }
}

/// Aggregated health of the gateway's services and infrastructure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDocument {
    /// `unhealthy` if any entry is unhealthy, otherwise `healthy`.
    pub status: HealthStatus,
    /// When the document was assembled.
    pub timestamp: DateTime<Utc>,
    /// Time since the gateway started.
    pub process_uptime_ms: u64,
    /// Per-service results.
    pub services: BTreeMap<ServiceId, ServiceHealth>,
    /// Per-dependency results, keyed by probe name.
    pub infrastructure: BTreeMap<String, InfrastructureHealth>,
}
