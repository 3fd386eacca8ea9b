use std::env;
use std::fmt;
use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the planning service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub database: DatabaseConfig,
    pub optimizer: OptimizerConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let bind = env::var("HTTP_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let database_url = env::var("DB_URL").ok();
        let external_url = env::var("EXTERNAL_OPTIMIZER_URL").ok();
        let timeout_ms = match env::var("OPTIMIZER_TIMEOUT_MS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout)?,
            Err(_) => 60_000,
        };

        Ok(Self {
            environment,
            server: ServerConfig { bind },
            telemetry: TelemetryConfig { log_level },
            database: DatabaseConfig { url: database_url },
            optimizer: OptimizerConfig {
                external_url,
                timeout: Duration::from_millis(timeout_ms),
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if let Some(port) = self.bind.strip_prefix("localhost:") {
            let port = port.parse::<u16>().map_err(|_| ConfigError::InvalidBind {
                bind: self.bind.clone(),
                source: None,
            })?;
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), port));
        }

        self.bind
            .parse()
            .map_err(|source| ConfigError::InvalidBind {
                bind: self.bind.clone(),
                source: Some(source),
            })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Datastore connection string; absent means the service runs its in-memory
/// repositories.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

/// Remote optimizer endpoint; absent means every plan is ranked locally.
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    pub external_url: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidBind {
        bind: String,
        source: Option<AddrParseError>,
    },
    InvalidTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidBind { bind, .. } => {
                write!(f, "HTTP_BIND '{}' must be a host:port listen address", bind)
            }
            ConfigError::InvalidTimeout => {
                write!(f, "OPTIMIZER_TIMEOUT_MS must be a duration in milliseconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidBind { source, .. } => {
                source.as_ref().map(|err| err as &(dyn std::error::Error + 'static))
            }
            ConfigError::InvalidTimeout => None,
        }
    }
}
