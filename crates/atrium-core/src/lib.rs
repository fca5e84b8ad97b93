//! Core types and utilities for the atrium gateway.
//!
//! This crate provides the I/O-free building blocks shared by the gateway
//! and the health subsystem:
//!
//! - **Identifiers**: the closed [`ServiceId`] set of backend services
//! - **Registry**: the startup-resolved [`ServiceRegistry`] of base URLs
//! - **Path resolution**: the dual-scheme [`resolve`] function that maps an
//!   inbound path onto a backend service
//!
//! # Example
//!
//! ```
//! use atrium_core::{resolve, ServiceId};
//!
//! let target = resolve("/v1/course/123", Some("page=2")).unwrap();
//! assert_eq!(target.service, ServiceId::Course);
//! assert_eq!(target.path, "/123");
//! assert_eq!(target.query, "page=2");
//!
//! let legacy = resolve("/media", None).unwrap();
//! assert_eq!(legacy.service, ServiceId::Media);
//! assert_eq!(legacy.path, "/");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod registry;
pub mod resolve;

pub use error::{CoreError, Result};
pub use ids::ServiceId;
pub use registry::ServiceRegistry;
pub use resolve::{resolve, ResolvedTarget, RouteMiss};
