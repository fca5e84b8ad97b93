//! Dual-scheme path resolution.
//!
//! Inbound paths reach a backend service through one of two schemes:
//!
//! - **versioned**: `/v{n}/{service}{remainder}`
//! - **legacy**: `/{service}{remainder}`
//!
//! The versioned scheme is tried first. The version number is accepted but
//! not interpreted; every version maps onto the same backend. A remainder is
//! either empty or starts with `/`, so `/coursework` does not match `course`.

use thiserror::Error;

use crate::ids::ServiceId;

/// A request path resolved to a backend service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// The service that owns the path.
    pub service: ServiceId,
    /// Path on the downstream service. Always starts with `/`.
    pub path: String,
    /// Raw query string without the leading `?`. Empty when absent.
    pub query: String,
}

impl ResolvedTarget {
    /// Downstream path with the query string appended verbatim.
    #[must_use]
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}

/// No scheme matched a known service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no service matches the request path")]
pub struct RouteMiss {
    /// The valid service identifiers, in declaration order.
    pub available_services: [&'static str; 6],
}

impl Default for RouteMiss {
    fn default() -> Self {
        Self {
            available_services: ServiceId::names(),
        }
    }
}

/// Resolve a request path against the versioned and legacy schemes.
///
/// The reserved gateway paths (`/` and `/internal/health`) are routed by the
/// HTTP layer and never passed here.
///
/// # Errors
///
/// Returns [`RouteMiss`] when neither scheme names a known service.
pub fn resolve(path: &str, query: Option<&str>) -> Result<ResolvedTarget, RouteMiss> {
    let Some(rest) = path.strip_prefix('/') else {
        return Err(RouteMiss::default());
    };

    let (service, remainder) = match_versioned(rest)
        .or_else(|| match_service(rest))
        .ok_or_else(RouteMiss::default)?;

    let path = if remainder.is_empty() {
        "/".to_string()
    } else {
        remainder.to_string()
    };

    Ok(ResolvedTarget {
        service,
        path,
        query: query.unwrap_or_default().to_string(),
    })
}

/// `v{digits}/{service}{remainder}`
fn match_versioned(rest: &str) -> Option<(ServiceId, &str)> {
    let (version, after) = split_segment(rest);
    if !is_version(version) {
        return None;
    }
    match_service(after.strip_prefix('/')?)
}

/// `{service}{remainder}`
fn match_service(rest: &str) -> Option<(ServiceId, &str)> {
    let (segment, remainder) = split_segment(rest);
    let service = segment.parse().ok()?;
    Some((service, remainder))
}

/// Split off the first segment. The remainder is empty or starts with `/`.
fn split_segment(s: &str) -> (&str, &str) {
    match s.find('/') {
        Some(i) => s.split_at(i),
        None => (s, ""),
    }
}

fn is_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}
