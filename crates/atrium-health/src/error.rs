//! Error types for the health crate.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while setting up health checking.
#[derive(Debug, Error)]
pub enum HealthError {
    /// The HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Why a single probe reported unhealthy.
///
/// Probe errors never leave the health subsystem; they are rendered into
/// the `error` field of the affected entry.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probe did not finish within its time budget.
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The client or connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Connected, but the liveness operation failed.
    #[error("liveness check failed: {0}")]
    Check(String),

    /// The endpoint answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(u16),

    /// Releasing the connection failed.
    #[error("teardown failed: {0}")]
    Teardown(String),
}

impl ProbeError {
    /// Map a connection error.
    pub(crate) fn connect(err: impl std::fmt::Display) -> Self {
        Self::Connect(err.to_string())
    }

    /// Map a liveness-operation error.
    pub(crate) fn check(err: impl std::fmt::Display) -> Self {
        Self::Check(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_is_in_millis() {
        let err = ProbeError::Timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "timed out after 5000ms");
    }

    #[test]
    fn status_message() {
        assert_eq!(ProbeError::Status(503).to_string(), "unexpected status 503");
    }
}
