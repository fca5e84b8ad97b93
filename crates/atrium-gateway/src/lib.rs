//! HTTP ingress gateway for the atrium backend services.
//!
//! This crate provides the public-facing entry point in front of the
//! backend services. It handles:
//!
//! - Dual-scheme path routing (`/v{n}/{service}/...` and `/{service}/...`)
//! - Transparent request forwarding with response relay
//! - Aggregated health reporting across services and infrastructure
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Clients                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      atrium-gateway                         │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │  Reserved   │ │   Path      │ │     Forwarder       │    │
//! │  │  / + health │ │   Resolver  │ │     (reqwest)       │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!           ┌──────────────────┼──────────────────┐
//!           ▼                  ▼                  ▼
//!    ┌────────────┐     ┌────────────┐     ┌────────────────┐
//!    │  Backend   │     │  Health    │     │ Infrastructure │
//!    │  Services  │     │  Checker   │     │    Probes      │
//!    └────────────┘     └────────────┘     └────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use atrium_gateway::{create_router, GatewayConfig, GatewayState};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::from_env()?;
//! let listen_addr = config.listen_addr.clone();
//! let state = GatewayState::from_config(config)?;
//!
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod proxy;
pub mod routes;
pub mod state;

pub use config::{ConfigError, GatewayConfig};
pub use error::{ApiError, ErrorReply, StartupError};
pub use proxy::{Forwarder, ProxyError, ProxyRequest, ProxyResponse};
pub use routes::create_router;
pub use state::GatewayState;
