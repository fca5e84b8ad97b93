//! Gateway configuration.
//!
//! Configuration is read once at startup from environment variables. The
//! loader works over any key lookup so it can be exercised without touching
//! the process environment.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use atrium_core::{ServiceId, ServiceRegistry};
use atrium_health::probes::{
    ElasticsearchConfig, MinioConfig, MongoConfig, PostgresConfig, RabbitMqConfig, RedisConfig,
};
use atrium_health::InfrastructureConfig;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to a value that does not parse.
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        /// Environment variable name.
        key: String,
        /// The offending value.
        value: String,
        /// Parser message.
        reason: String,
    },
}

/// Configuration for the gateway service.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Listen address (e.g., "0.0.0.0:3000").
    pub listen_addr: String,

    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,

    /// Maximum inbound request body size in bytes.
    pub max_body_bytes: usize,

    /// Inbound request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Timeout for each forwarded call in seconds.
    pub proxy_timeout_seconds: u64,

    /// Maximum redirects followed by a forwarded call.
    pub proxy_max_redirects: usize,

    /// Timeout for each health probe in seconds.
    pub health_probe_timeout_seconds: u64,

    /// Backend service addressing.
    pub services: ServicesConfig,

    /// Infrastructure connection parameters.
    pub infrastructure: InfrastructureConfig,
}

impl GatewayConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:3000".to_string()
    }

    const fn default_max_body() -> usize {
        10 * 1024 * 1024 // 10 MB
    }

    const fn default_request_timeout() -> u64 {
        60
    }

    const fn default_proxy_timeout() -> u64 {
        30
    }

    const fn default_max_redirects() -> usize {
        5
    }

    const fn default_probe_timeout() -> u64 {
        5
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unset and empty variables fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);
        let services = ServicesConfig::load(&env)?;
        let infrastructure = load_infrastructure(&env, services.local_mode)?;

        Ok(Self {
            listen_addr: env.string("LISTEN_ADDR", &Self::default_listen_addr()),
            cors_origins: env
                .string("CORS_ORIGINS", "*")
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect(),
            max_body_bytes: env.parse("MAX_BODY_BYTES", Self::default_max_body())?,
            request_timeout_seconds: env
                .parse("REQUEST_TIMEOUT_SECONDS", Self::default_request_timeout())?,
            proxy_timeout_seconds: env
                .parse("PROXY_TIMEOUT_SECONDS", Self::default_proxy_timeout())?,
            proxy_max_redirects: env.parse("PROXY_MAX_REDIRECTS", Self::default_max_redirects())?,
            health_probe_timeout_seconds: env
                .parse("HEALTH_PROBE_TIMEOUT_SECONDS", Self::default_probe_timeout())?,
            services,
            infrastructure,
        })
    }

    /// Get the inbound request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Get the forwarded call timeout as a `Duration`.
    #[must_use]
    pub fn proxy_timeout(&self) -> Duration {
        Duration::from_secs(self.proxy_timeout_seconds)
    }

    /// Get the health probe timeout as a `Duration`.
    #[must_use]
    pub fn health_probe_timeout(&self) -> Duration {
        Duration::from_secs(self.health_probe_timeout_seconds)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            cors_origins: vec!["*".to_string()],
            max_body_bytes: Self::default_max_body(),
            request_timeout_seconds: Self::default_request_timeout(),
            proxy_timeout_seconds: Self::default_proxy_timeout(),
            proxy_max_redirects: Self::default_max_redirects(),
            health_probe_timeout_seconds: Self::default_probe_timeout(),
            services: ServicesConfig::default(),
            infrastructure: InfrastructureConfig::default(),
        }
    }
}

/// How backend services are addressed.
///
/// In network mode each service is reached at `<id>-service`; in local mode
/// at `localhost`. Per-service host and port overrides win over both.
#[derive(Debug, Clone, Default)]
pub struct ServicesConfig {
    /// Address every service at `localhost`.
    pub local_mode: bool,
    /// Host overrides.
    pub hosts: BTreeMap<ServiceId, String>,
    /// Port overrides.
    pub ports: BTreeMap<ServiceId, u16>,
}

impl ServicesConfig {
    fn load<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<Self, ConfigError> {
        let mut config = Self {
            local_mode: env.flag("GATEWAY_LOCAL_MODE")?,
            ..Self::default()
        };

        for id in ServiceId::ALL {
            let prefix = id.as_str().to_ascii_uppercase();
            if let Some(host) = env.optional(&format!("{prefix}_SERVICE_HOST")) {
                config.hosts.insert(id, host);
            }
            let port_key = format!("{prefix}_SERVICE_PORT");
            if env.optional(&port_key).is_some() {
                config.ports.insert(id, env.parse(&port_key, id.default_port())?);
            }
        }

        Ok(config)
    }

    /// Host a service is reached at.
    #[must_use]
    pub fn host(&self, id: ServiceId) -> String {
        match self.hosts.get(&id) {
            Some(host) => host.clone(),
            None if self.local_mode => "localhost".to_string(),
            None => format!("{id}-service"),
        }
    }

    /// Port a service is reached at.
    #[must_use]
    pub fn port(&self, id: ServiceId) -> u16 {
        self.ports.get(&id).copied().unwrap_or(id.default_port())
    }

    /// Resolve the base URL of every service.
    #[must_use]
    pub fn registry(&self) -> ServiceRegistry {
        ServiceRegistry::from_fn(|id| format!("http://{}:{}", self.host(id), self.port(id)))
    }
}

fn load_infrastructure<F: Fn(&str) -> Option<String>>(
    env: &Env<F>,
    local_mode: bool,
) -> Result<InfrastructureConfig, ConfigError> {
    let host = |container: &str| {
        if local_mode {
            "localhost".to_string()
        } else {
            container.to_string()
        }
    };

    let postgres = PostgresConfig::default();
    let redis = RedisConfig::default();
    let minio = MinioConfig::default();
    let rabbitmq = RabbitMqConfig::default();

    Ok(InfrastructureConfig {
        postgres: PostgresConfig {
            host: env.string("POSTGRES_HOST", &host(&postgres.host)),
            port: env.parse("POSTGRES_PORT", postgres.port)?,
            user: env.string("POSTGRES_USER", &postgres.user),
            password: env.string("POSTGRES_PASSWORD", &postgres.password),
            database: env.string("POSTGRES_DB", &postgres.database),
        },
        mongodb: MongoConfig {
            uri: env.string(
                "MONGODB_URI",
                &format!("mongodb://{}:27017", host("mongodb")),
            ),
        },
        redis: RedisConfig {
            host: env.string("REDIS_HOST", &host(&redis.host)),
            port: env.parse("REDIS_PORT", redis.port)?,
            password: env.optional("REDIS_PASSWORD"),
        },
        elasticsearch: ElasticsearchConfig {
            url: env.string(
                "ELASTICSEARCH_URL",
                &format!("http://{}:9200", host("elasticsearch")),
            ),
            username: env.optional("ELASTICSEARCH_USERNAME"),
            password: env.optional("ELASTICSEARCH_PASSWORD"),
        },
        minio: MinioConfig {
            endpoint: env.string("MINIO_ENDPOINT", &host(&minio.endpoint)),
            port: env.parse("MINIO_PORT", minio.port)?,
            use_ssl: env.flag("MINIO_USE_SSL")?,
        },
        rabbitmq: RabbitMqConfig {
            host: env.string("RABBITMQ_HOST", &host(&rabbitmq.host)),
            management_port: env.parse("RABBITMQ_MANAGEMENT_PORT", rabbitmq.management_port)?,
            user: env.string("RABBITMQ_USER", &rabbitmq.user),
            password: env.string("RABBITMQ_PASSWORD", &rabbitmq.password),
        },
    })
}

/// Typed access over a key lookup.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.optional(key) {
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }

    fn flag(&self, key: &str) -> Result<bool, ConfigError> {
        let Some(raw) = self.optional(key) else {
            return Ok(false);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                key: key.to_string(),
                value: raw,
                reason: "expected a boolean".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:3000");
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
        assert_eq!(config.proxy_max_redirects, 5);
        assert_eq!(config.max_body_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn timeout_durations() {
        let config = GatewayConfig::default();
        assert_eq!(config.proxy_timeout(), Duration::from_secs(30));
        assert_eq!(config.health_probe_timeout(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn empty_environment_uses_network_mode() {
        let config = load(&[]).unwrap();
        let registry = config.services.registry();

        assert!(!config.services.local_mode);
        assert_eq!(
            registry.base_url(ServiceId::Course),
            "http://course-service:3002"
        );
        assert_eq!(
            registry.base_url(ServiceId::Indexer),
            "http://indexer-service:3006"
        );
        assert_eq!(config.infrastructure.postgres.host, "postgres");
        assert_eq!(config.infrastructure.mongodb.uri, "mongodb://mongodb:27017");
    }

    #[test]
    fn local_mode_uses_localhost() {
        let config = load(&[("GATEWAY_LOCAL_MODE", "true")]).unwrap();
        let registry = config.services.registry();

        assert_eq!(registry.base_url(ServiceId::Media), "http://localhost:3003");
        assert_eq!(config.infrastructure.redis.host, "localhost");
        assert_eq!(
            config.infrastructure.elasticsearch.url,
            "http://localhost:9200"
        );
    }

    #[test]
    fn service_overrides_win() {
        let config = load(&[
            ("GATEWAY_LOCAL_MODE", "1"),
            ("REVIEWS_SERVICE_HOST", "reviews.internal"),
            ("REVIEWS_SERVICE_PORT", "8080"),
            ("IDENTITY_SERVICE_PORT", "4001"),
        ])
        .unwrap();
        let registry = config.services.registry();

        assert_eq!(
            registry.base_url(ServiceId::Reviews),
            "http://reviews.internal:8080"
        );
        assert_eq!(
            registry.base_url(ServiceId::Identity),
            "http://localhost:4001"
        );
    }

    #[test]
    fn infrastructure_overrides() {
        let config = load(&[
            ("POSTGRES_HOST", "db.internal"),
            ("POSTGRES_PORT", "6543"),
            ("REDIS_PASSWORD", "hunter2"),
            ("MINIO_USE_SSL", "true"),
            ("RABBITMQ_MANAGEMENT_PORT", "25672"),
        ])
        .unwrap();
        let infra = &config.infrastructure;

        assert_eq!(infra.postgres.host, "db.internal");
        assert_eq!(infra.postgres.port, 6543);
        assert_eq!(infra.redis.password.as_deref(), Some("hunter2"));
        assert!(infra.minio.use_ssl);
        assert_eq!(infra.rabbitmq.management_port, 25672);
    }

    #[test]
    fn cors_origins_are_split() {
        let config = load(&[(
            "CORS_ORIGINS",
            "http://localhost:5173, https://app.example.com",
        )])
        .unwrap();
        assert_eq!(
            config.cors_origins,
            vec![
                "http://localhost:5173".to_string(),
                "https://app.example.com".to_string()
            ]
        );
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = load(&[("COURSE_SERVICE_PORT", "eighty")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { ref key, ref value, .. }
                if key == "COURSE_SERVICE_PORT" && value == "eighty"
        ));
    }

    #[test]
    fn invalid_flag_is_an_error() {
        assert!(load(&[("GATEWAY_LOCAL_MODE", "maybe")]).is_err());
    }
}
