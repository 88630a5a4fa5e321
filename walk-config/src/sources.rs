use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use walk_core::domain::FloorPolicy;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    pub redis: Option<FileRedisConfig>,
    #[serde(default)]
    pub admin: FileAdminConfig,
    #[serde(default)]
    pub membership: FileMembershipConfig,
    #[serde(default)]
    pub scanner: FileScannerConfig,
    #[serde(default)]
    pub notifications: FileNotificationConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<FileRouteConfig>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileRedisConfig {
    pub url: String,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAdminConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileMembershipConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor_policy: Option<FloorPolicy>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileScannerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_threshold_minutes: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileNotificationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<String>,
}

/// One `[[routes]]` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileRouteConfig {
    pub id: u8,
    pub name: String,
    pub waypoints: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_team_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_team_size: Option<u32>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub admin_secret: Option<String>,
    pub notify_webhook: Option<String>,
    pub threshold_minutes: Option<u32>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: non_empty_var("WALK_CONFIG_PATH").map(PathBuf::from),
            server_host: non_empty_var("WALK_SERVER_HOST"),
            server_port: non_empty_var("WALK_SERVER_PORT").and_then(|s| s.parse().ok()),
            database_url: non_empty_var("DATABASE_URL"),
            redis_url: non_empty_var("REDIS_URL"),
            admin_secret: non_empty_var("WALK_ADMIN_SECRET"),
            notify_webhook: non_empty_var("WALK_NOTIFY_WEBHOOK"),
            threshold_minutes: non_empty_var("WALK_TIMEOUT_MINUTES")
                .and_then(|s| s.parse().ok()),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}
