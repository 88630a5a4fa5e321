use std::{net::SocketAddr, path::PathBuf};

use url::Url;
use walk_core::{
    RouteDefinition, RouteTopology, TopologyError,
    domain::MembershipPolicy,
};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_THRESHOLD_MINUTES: u32 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: Option<RedisConfig>,
    pub admin: AdminConfig,
    pub membership: MembershipPolicy,
    pub scanner: ScannerConfig,
    pub notifications: NotificationConfig,
    pub routes: Vec<RouteDefinition>,
    pub metadata: ConfigMetadata,
}

impl Config {
    /// Build the shared route topology, validating every route.
    pub fn topology(&self) -> Result<RouteTopology, TopologyError> {
        RouteTopology::new(self.routes.iter().cloned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminConfig {
    /// Shared secret for operator-only read endpoints.
    pub secret: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    pub default_threshold_minutes: u32,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            default_threshold_minutes: DEFAULT_THRESHOLD_MINUTES,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationConfig {
    /// Messaging gateway; notifications are only logged when absent.
    pub webhook: Option<Url>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
    /// True when no `[[routes]]` were configured and the built-in set is used.
    pub builtin_routes: bool,
}
