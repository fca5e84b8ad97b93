//! Service registry.
//!
//! Maps each [`ServiceId`] to the base URL of its backend. The registry is
//! built once at startup and only read afterwards.

use crate::ids::ServiceId;

/// Startup-resolved lookup from service identifier to base URL.
///
/// Construction goes through a function over every [`ServiceId`], so the
/// table is total: each service has exactly one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRegistry {
    routes: [String; 6],
}

impl ServiceRegistry {
    /// Build a registry by computing the base URL of every service.
    ///
    /// Trailing slashes are trimmed so downstream paths can be appended
    /// directly.
    #[must_use]
    pub fn from_fn(mut base_url: impl FnMut(ServiceId) -> String) -> Self {
        let routes = ServiceId::ALL.map(|id| base_url(id).trim_end_matches('/').to_string());
        Self { routes }
    }

    /// Build a registry pointing every service at the same base URL.
    #[must_use]
    pub fn uniform(base_url: &str) -> Self {
        Self::from_fn(|_| base_url.to_string())
    }

    /// Get the base URL for a service.
    #[must_use]
    pub fn base_url(&self, id: ServiceId) -> &str {
        &self.routes[id.index()]
    }

    /// Iterate over every `(service, base URL)` pair in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (ServiceId, &str)> {
        ServiceId::ALL
            .into_iter()
            .map(move |id| (id, self.base_url(id)))
    }
}
