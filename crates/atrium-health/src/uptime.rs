//! Per-service uptime tracking.
//!
//! The tracker keeps two facts per service: when tracking started (fixed at
//! construction) and when the service was last seen healthy. Only the
//! health checker writes, and only forward in time.

use std::time::Duration;

use atrium_core::ServiceId;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

/// Snapshot of one service's uptime record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UptimeEntry {
    /// When tracking started. Never changes.
    pub start_time: DateTime<Utc>,
    /// Last successful probe, if any.
    pub last_healthy_time: Option<DateTime<Utc>>,
}

/// Process-wide uptime table with one slot per [`ServiceId`].
///
/// Each slot has its own lock, so updates for different services never
/// contend.
#[derive(Debug)]
pub struct UptimeTracker {
    start_time: DateTime<Utc>,
    last_healthy: [RwLock<Option<DateTime<Utc>>>; 6],
}

impl UptimeTracker {
    /// Start tracking now.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Start tracking at a given instant.
    #[must_use]
    pub fn starting_at(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            last_healthy: std::array::from_fn(|_| RwLock::new(None)),
        }
    }

    /// Record a healthy observation.
    ///
    /// Timestamps older than the stored one are ignored.
    pub fn record_healthy(&self, id: ServiceId, at: DateTime<Utc>) {
        let mut slot = self.last_healthy[id.index()].write();
        if slot.map_or(true, |prev| at > prev) {
            *slot = Some(at);
        }
    }

    /// Read the record for a service.
    #[must_use]
    pub fn entry(&self, id: ServiceId) -> UptimeEntry {
        UptimeEntry {
            start_time: self.start_time,
            last_healthy_time: *self.last_healthy[id.index()].read(),
        }
    }

    /// Time between tracker start and `now`, zero if `now` is earlier.
    #[must_use]
    pub fn uptime(&self, now: DateTime<Utc>) -> Duration {
        (now - self.start_time).to_std().unwrap_or_default()
    }
}

impl Default for UptimeTracker {
    fn default() -> Self {
        Self::new()
    }
}
