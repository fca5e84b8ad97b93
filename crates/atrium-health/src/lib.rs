//! Health checks for the atrium gateway.
//!
//! This crate probes the liveness of every backend service and of the
//! infrastructure the platform depends on, and folds the results into a
//! single [`HealthDocument`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     HealthAggregator                        │
//! └─────────────────────────────────────────────────────────────┘
//!                │                               │
//!                ▼                               ▼
//! ┌──────────────────────────┐   ┌──────────────────────────────┐
//! │      ServiceChecker      │   │         InfraProbe ×6        │
//! │  GET /health, then GET / │   │ postgres  mongodb  redis     │
//! │   ──► UptimeTracker      │   │ elasticsearch minio rabbitmq │
//! └──────────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! Probes never fail outward: a timeout, refused connection, or bad status
//! becomes an `unhealthy` entry carrying an error message.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod checker;
pub mod error;
pub mod probes;
pub mod types;
pub mod uptime;

pub use aggregator::HealthAggregator;
pub use checker::ServiceChecker;
pub use error::{HealthError, ProbeError};
pub use probes::{InfraProbe, InfrastructureConfig};
pub use types::{HealthDocument, HealthStatus, InfrastructureHealth, ServiceHealth};
pub use uptime::{UptimeEntry, UptimeTracker};

use std::time::Instant;

/// Milliseconds elapsed since `started`, saturating at `u64::MAX`.
pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
