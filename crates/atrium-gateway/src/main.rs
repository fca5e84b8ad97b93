//! Atrium Gateway - HTTP ingress for the backend services
//!
//! This is the main entry point for the gateway service.
//! The gateway routes requests to the backend services and reports the
//! aggregated health of the services and their infrastructure.
//!
//! # Local Mode
//!
//! Set `GATEWAY_LOCAL_MODE=true` to address every service and dependency at
//! `localhost` instead of its container name.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atrium_core::ServiceId;
use atrium_gateway::{create_router, GatewayConfig, GatewayState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,atrium=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Atrium Gateway");

    // Load configuration from environment
    let config = GatewayConfig::from_env()?;
    let listen_addr = config.listen_addr.clone();

    tracing::info!(
        listen_addr = %listen_addr,
        local_mode = config.services.local_mode,
        proxy_timeout_seconds = config.proxy_timeout_seconds,
        health_probe_timeout_seconds = config.health_probe_timeout_seconds,
        "Gateway configuration loaded"
    );
    for id in ServiceId::ALL {
        tracing::info!(
            service = %id,
            host = %config.services.host(id),
            port = config.services.port(id),
            "Service route registered"
        );
    }

    // Build gateway state
    let state = GatewayState::from_config(config)?;

    let app = create_router(state);
    tracing::info!("Router configured with reserved and proxied routes");

    // Start HTTP server
    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gateway stopped");
    Ok(())
}

/// Resolve when the process receives Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
