//! Cache probe.

use std::time::Duration;

use ::redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use async_trait::async_trait;
use serde_json::Value;

use super::{run_probe, Details, InfraProbe};
use crate::error::ProbeError;
use crate::types::InfrastructureHealth;

/// Redis connection parameters.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Optional `AUTH` password.
    pub password: Option<String>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "redis".to_string(),
            port: 6379,
            password: None,
        }
    }
}

impl RedisConfig {
    /// Connection parameters for this config.
    ///
    /// Built field by field so the password is never parsed as part of a URL.
    #[must_use]
    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: RedisConnectionInfo {
                password: self.password.clone(),
                ..RedisConnectionInfo::default()
            },
        }
    }
}

/// Opens one connection, sends `PING` and `INFO server`, and drops it.
#[derive(Debug, Clone)]
pub struct RedisProbe {
    config: RedisConfig,
    timeout: Duration,
}

impl RedisProbe {
    /// Create a probe.
    #[must_use]
    pub fn new(config: RedisConfig, timeout: Duration) -> Self {
        Self { config, timeout }
    }

    async fn check(&self) -> Result<Details, ProbeError> {
        let client =
            ::redis::Client::open(self.config.connection_info()).map_err(ProbeError::connect)?;
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(ProbeError::connect)?;

        let pong: String = ::redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(ProbeError::check)?;
        if pong != "PONG" {
            return Err(ProbeError::Check(format!("unexpected PING reply {pong:?}")));
        }

        let info: String = ::redis::cmd("INFO")
            .arg("server")
            .query_async(&mut conn)
            .await
            .map_err(ProbeError::check)?;

        Ok(parse_info(&info))
    }
}

/// Extract version and uptime from an `INFO server` reply.
fn parse_info(info: &str) -> Details {
    let mut details = Details::new();
    for line in info.lines() {
        match line.trim_end().split_once(':') {
            Some(("redis_version", version)) => {
                details.insert("version".to_string(), Value::from(version));
            }
            Some(("uptime_in_seconds", secs)) => {
                if let Ok(secs) = secs.parse::<u64>() {
                    details.insert("uptimeSeconds".to_string(), Value::from(secs));
                }
            }
            _ => {}
        }
    }
    details
}

#[async_trait]
impl InfraProbe for RedisProbe {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn probe(&self) -> InfrastructureHealth {
        run_probe(self.name(), self.timeout, self.check()).await
    }
}
