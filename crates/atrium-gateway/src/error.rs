//! API error types and responses.
//!
//! Errors are rendered as JSON bodies carrying the status code, a message,
//! the time, and the request path:
//!
//! ```text
//! {
//!   "statusCode": 404,
//!   "message": "no service matches path /unknown/path",
//!   "availableServices": ["identity", "course", ...],
//!   "timestamp": "2024-01-01T00:00:00Z",
//!   "path": "/unknown/path"
//! }
//! ```

use atrium_core::ServiceId;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::proxy::ProxyError;

/// API error type.
///
/// Attach the request path with [`ApiError::at`] to get a response.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No routing scheme matched a known service.
    #[error("no service matches path {0}")]
    RouteNotFound(String),

    /// The downstream service could not be reached.
    #[error("service {service} is unavailable: {reason}")]
    BadGateway {
        /// Target service.
        service: ServiceId,
        /// Underlying transport failure.
        reason: String,
    },
}

impl ApiError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::RouteNotFound(_) => StatusCode::NOT_FOUND,
            Self::BadGateway { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Attach the request path, producing a renderable reply.
    #[must_use]
    pub fn at(self, path: impl Into<String>) -> ErrorReply {
        ErrorReply {
            error: self,
            path: path.into(),
        }
    }
}

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::Network { service, reason } => Self::BadGateway { service, reason },
        }
    }
}

/// Errors raised while assembling the gateway at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The forwarding client could not be built.
    #[error("failed to create forwarding client: {0}")]
    Client(#[from] reqwest::Error),

    /// The health subsystem could not be built.
    #[error(transparent)]
    Health(#[from] atrium_health::HealthError),
}

/// An [`ApiError`] bound to the request path it occurred on.
#[derive(Debug)]
pub struct ErrorReply {
    /// The error.
    pub error: ApiError,
    /// Inbound request path.
    pub path: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    status_code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    available_services: Option<[&'static str; 6]>,
    timestamp: DateTime<Utc>,
    path: String,
}

impl IntoResponse for ErrorReply {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let available_services =
            matches!(self.error, ApiError::RouteNotFound(_)).then(ServiceId::names);

        let body = ErrorResponse {
            status_code: status.as_u16(),
            message: self.error.to_string(),
            available_services,
            timestamp: Utc::now(),
            path: self.path,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(reply: ErrorReply) -> (StatusCode, Value) {
        let response = reply.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn error_status_codes() {
        assert_eq!(
            ApiError::RouteNotFound("/x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::BadGateway {
                service: ServiceId::Course,
                reason: "refused".into()
            }
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn route_not_found_lists_services() {
        let reply = ApiError::RouteNotFound("/foo/bar".into()).at("/foo/bar");
        let (status, body) = body_json(reply).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["statusCode"], 404);
        assert_eq!(body["path"], "/foo/bar");
        assert_eq!(
            body["availableServices"],
            serde_json::json!(["identity", "course", "media", "progress", "reviews", "indexer"])
        );
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn bad_gateway_names_service_and_cause() {
        let error = ApiError::from(ProxyError::Network {
            service: ServiceId::Media,
            reason: "connection refused".into(),
        });
        let (status, body) = body_json(error.at("/v1/media/upload")).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["statusCode"], 502);
        assert_eq!(
            body["message"],
            "service media is unavailable: connection refused"
        );
        assert!(body.get("availableServices").is_none());
    }
}
