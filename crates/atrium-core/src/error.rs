//! Common error types for atrium.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors shared across the atrium crates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The name does not belong to the closed set of backend services.
    #[error("unknown service: {0}")]
    UnknownService(String),
}
