//! End-to-end tests for the gateway router.
//!
//! Downstream services are simulated with wiremock; infrastructure probes are
//! replaced by fixed fakes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use atrium_core::{ServiceId, ServiceRegistry};
use atrium_gateway::{create_router, Forwarder, GatewayConfig, GatewayState};
use atrium_health::{
    HealthAggregator, InfraProbe, InfrastructureHealth, ServiceChecker, UptimeTracker,
};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Map, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UNREACHABLE: &str = "http://127.0.0.1:1";

struct FixedProbe {
    name: &'static str,
    healthy: bool,
}

#[async_trait]
impl InfraProbe for FixedProbe {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn probe(&self) -> InfrastructureHealth {
        if self.healthy {
            InfrastructureHealth::healthy(2, Map::new())
        } else {
            InfrastructureHealth::unhealthy(2, "connection refused")
        }
    }
}

fn healthy_infrastructure() -> Vec<Arc<dyn InfraProbe>> {
    ["postgres", "mongodb", "redis", "elasticsearch", "minio", "rabbitmq"]
        .into_iter()
        .map(|name| Arc::new(FixedProbe { name, healthy: true }) as Arc<dyn InfraProbe>)
        .collect()
}

fn gateway(registry: ServiceRegistry, probes: Vec<Arc<dyn InfraProbe>>) -> TestServer {
    let registry = Arc::new(registry);
    let checker = ServiceChecker::new(
        Arc::clone(&registry),
        Arc::new(UptimeTracker::new()),
        Duration::from_secs(2),
    )
    .unwrap();
    let state = GatewayState::new(
        GatewayConfig::default(),
        Forwarder::new(registry, Duration::from_secs(5), 5).unwrap(),
        HealthAggregator::new(Arc::new(checker), probes),
    );

    TestServer::new(create_router(state)).unwrap()
}

async fn healthy_backend() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;
    server
}

// =============================================================================
// Reserved paths
// =============================================================================

#[tokio::test]
async fn root_describes_the_gateway() {
    let server = gateway(ServiceRegistry::uniform(UNREACHABLE), Vec::new());

    let response = server.get("/").await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["name"], "atrium-gateway");
    assert_eq!(
        body["services"],
        json!(["identity", "course", "media", "progress", "reviews", "indexer"])
    );
    assert_eq!(body["health"], "/internal/health");
}

#[tokio::test]
async fn health_reports_all_healthy() {
    let backend = healthy_backend().await;
    let server = gateway(
        ServiceRegistry::uniform(&backend.uri()),
        healthy_infrastructure(),
    );

    let response = server.get("/internal/health").await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"].as_object().unwrap().len(), 6);
    assert_eq!(body["infrastructure"].as_object().unwrap().len(), 6);
    assert_eq!(body["services"]["course"]["status"], "healthy");
    assert!(body["services"]["course"]["uptimeMs"].is_u64());
    assert!(body["processUptimeMs"].is_u64());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn failed_media_probe_marks_document_unhealthy() {
    let backend = healthy_backend().await;
    let uri = backend.uri();
    let registry = ServiceRegistry::from_fn(|id| {
        if id == ServiceId::Media {
            UNREACHABLE.to_string()
        } else {
            uri.clone()
        }
    });
    let server = gateway(registry, healthy_infrastructure());

    let response = server.get("/internal/health").await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["services"]["media"]["status"], "unhealthy");
    assert!(!body["services"]["media"]["error"]
        .as_str()
        .unwrap()
        .is_empty());
    assert_eq!(body["services"]["identity"]["status"], "healthy");
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn failed_infrastructure_marks_document_unhealthy() {
    let backend = healthy_backend().await;
    let mut probes = healthy_infrastructure();
    probes[3] = Arc::new(FixedProbe {
        name: "elasticsearch",
        healthy: false,
    });
    let server = gateway(ServiceRegistry::uniform(&backend.uri()), probes);

    let body = server.get("/internal/health").await.json::<Value>();

    assert_eq!(body["infrastructure"]["elasticsearch"]["status"], "unhealthy");
    assert_eq!(
        body["infrastructure"]["elasticsearch"]["error"],
        "connection refused"
    );
    assert_eq!(body["status"], "unhealthy");
}

// =============================================================================
// Routing
// =============================================================================

#[tokio::test]
async fn unknown_path_is_404_without_outbound_call() {
    let backend = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;
    let server = gateway(ServiceRegistry::uniform(&backend.uri()), Vec::new());

    let response = server.get("/unknown/path").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body = response.json::<Value>();
    assert_eq!(body["statusCode"], 404);
    assert_eq!(body["path"], "/unknown/path");
    for name in ServiceId::names() {
        assert!(body["availableServices"]
            .as_array()
            .unwrap()
            .contains(&Value::from(name)));
    }
}

#[tokio::test]
async fn versioned_get_relays_status_and_body() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/123"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"id": "123"}))
                .insert_header("x-request-id", "req-42")
                .insert_header("content-encoding", "identity"),
        )
        .expect(1)
        .mount(&backend)
        .await;
    let server = gateway(ServiceRegistry::uniform(&backend.uri()), Vec::new());

    let response = server.get("/v1/course/123").await;

    response.assert_status(StatusCode::CREATED);
    response.assert_json(&json!({"id": "123"}));
    assert_eq!(response.header("x-request-id"), "req-42");
    assert!(response
        .headers()
        .get("content-encoding")
        .is_none());
}

#[tokio::test]
async fn legacy_post_forwards_body_query_and_headers() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ratings"))
        .and(query_param("course", "c1"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer token"))
        .and(body_json(json!({"stars": 5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&backend)
        .await;
    let server = gateway(ServiceRegistry::uniform(&backend.uri()), Vec::new());

    let response = server
        .post("/reviews/ratings?course=c1")
        .add_header(
            HeaderName::from_static("authorization"),
            HeaderValue::from_static("Bearer token"),
        )
        .json(&json!({"stars": 5}))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({"ok": true}));
}

#[tokio::test]
async fn empty_remainder_forwards_to_root() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Hello World!"))
        .expect(1)
        .mount(&backend)
        .await;
    let server = gateway(ServiceRegistry::uniform(&backend.uri()), Vec::new());

    let response = server.get("/v3/indexer").await;

    response.assert_status_ok();
    response.assert_text("Hello World!");
}

#[tokio::test]
async fn downstream_error_status_is_relayed() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "forbidden"})))
        .mount(&backend)
        .await;
    let server = gateway(ServiceRegistry::uniform(&backend.uri()), Vec::new());

    let response = server.get("/identity/admin").await;

    response.assert_status(StatusCode::FORBIDDEN);
    response.assert_json(&json!({"message": "forbidden"}));
}

#[tokio::test]
async fn unreachable_service_is_502() {
    let server = gateway(ServiceRegistry::uniform(UNREACHABLE), Vec::new());

    let response = server.get("/v1/progress/summary").await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body = response.json::<Value>();
    assert_eq!(body["statusCode"], 502);
    assert_eq!(body["path"], "/v1/progress/summary");
    assert!(body["message"].as_str().unwrap().contains("progress"));
    assert!(body.get("availableServices").is_none());
}
