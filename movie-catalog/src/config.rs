//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: `MOVIES_`, sections split on `__`)
//! 2. Current working directory: ./config.toml
//! 3. Default values
//!
//! For example `MOVIES_STORE__URL=ws://db:8000` overrides `store.url`.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "MOVIES_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Service identity and logging
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// gRPC service configuration
    #[serde(default)]
    pub grpc: GrpcConfig,

    /// Document store configuration
    #[serde(default)]
    pub store: StoreConfig,
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name, attached to log output
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Log level used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// HTTP gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// HTTP listen port
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Address of the movie service
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Request timeout in seconds, also sent as the RPC deadline
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Largest accepted `per_page`; unbounded when unset
    #[serde(default)]
    pub max_per_page: Option<u32>,
}

/// gRPC service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrpcConfig {
    /// gRPC listen port
    #[serde(default = "default_grpc_port")]
    pub port: u16,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Connection URL (`ws://`, `wss://`, `http://`, `https://` or `mem://`)
    #[serde(default = "default_store_url")]
    pub url: String,

    /// Namespace
    #[serde(default = "default_store_name")]
    pub namespace: String,

    /// Database
    #[serde(default = "default_store_name")]
    pub database: String,

    /// Table holding movie records
    #[serde(default = "default_table")]
    pub table: String,

    /// Root username (optional)
    #[serde(default)]
    pub username: Option<String>,

    /// Root password (optional)
    #[serde(default)]
    pub password: Option<String>,
}

impl Config {
    /// Load configuration from defaults, ./config.toml and the environment
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load configuration from a specific file
    ///
    /// A missing file is skipped; environment variables still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("Loading configuration from: {}", path.display());
        }

        let config: Config = Self::figment(path).extract()?;
        config.validate().map_err(Error::Config)?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Reject values no component can run with
    pub fn validate(&self) -> std::result::Result<(), Box<figment::Error>> {
        if self.service.name.trim().is_empty() {
            return Err(invalid("service.name must not be empty"));
        }
        if !LOG_LEVELS.contains(&self.service.log_level.to_ascii_lowercase().as_str()) {
            return Err(invalid(format!(
                "service.log_level must be one of {}, got {:?}",
                LOG_LEVELS.join(", "),
                self.service.log_level
            )));
        }
        if self.gateway.port == 0 {
            return Err(invalid("gateway.port must not be 0"));
        }
        if self.grpc.port == 0 {
            return Err(invalid("grpc.port must not be 0"));
        }
        if self.gateway.timeout_secs == 0 {
            return Err(invalid("gateway.timeout_secs must be at least 1"));
        }
        if self.grpc.timeout_secs == 0 {
            return Err(invalid("grpc.timeout_secs must be at least 1"));
        }
        if self.gateway.max_per_page == Some(0) {
            return Err(invalid("gateway.max_per_page must be at least 1"));
        }
        if self.store.table.trim().is_empty() {
            return Err(invalid("store.table must not be empty"));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> Box<figment::Error> {
    Box::new(figment::Error::from(message.into()))
}

impl GatewayConfig {
    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl GrpcConfig {
    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            backend_url: default_backend_url(),
            timeout_secs: default_timeout(),
            max_per_page: None,
        }
    }
}

impl Default for GrpcConfig {
    fn default() -> Self {
        Self {
            port: default_grpc_port(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            namespace: default_store_name(),
            database: default_store_name(),
            table: default_table(),
            username: None,
            password: None,
        }
    }
}

fn default_service_name() -> String {
    "movie-catalog".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_gateway_port() -> u16 {
    8080
}

fn default_backend_url() -> String {
    "http://localhost:50051".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_grpc_port() -> u16 {
    50051
}

fn default_store_url() -> String {
    "mem://".to_string()
}

fn default_store_name() -> String {
    "grpc-demo".to_string()
}

fn default_table() -> String {
    "movies".to_string()
}
