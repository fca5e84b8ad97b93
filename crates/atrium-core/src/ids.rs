//! Backend service identifiers.
//!
//! The gateway fronts a fixed set of services. [`ServiceId`] is the closed
//! enumeration of them; every lookup table in the workspace is total over it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Identifier of a backend service reachable through the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceId {
    /// Users, credentials, and sessions.
    Identity,
    /// Course catalogue and content.
    Course,
    /// Uploaded media assets.
    Media,
    /// Learner progress tracking.
    Progress,
    /// Course reviews and ratings.
    Reviews,
    /// Search indexing.
    Indexer,
}

impl ServiceId {
    /// Every service, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Identity,
        Self::Course,
        Self::Media,
        Self::Progress,
        Self::Reviews,
        Self::Indexer,
    ];

    /// The path segment and JSON key for this service.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Course => "course",
            Self::Media => "media",
            Self::Progress => "progress",
            Self::Reviews => "reviews",
            Self::Indexer => "indexer",
        }
    }

    /// Port the service listens on unless configured otherwise.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Identity => 3001,
            Self::Course => 3002,
            Self::Media => 3003,
            Self::Progress => 3004,
            Self::Reviews => 3005,
            Self::Indexer => 3006,
        }
    }

    /// Position of this service in [`ServiceId::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Names of all services, in declaration order.
    #[must_use]
    pub fn names() -> [&'static str; 6] {
        Self::ALL.map(Self::as_str)
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| CoreError::UnknownService(s.to_string()))
    }
}
