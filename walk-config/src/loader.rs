use std::{
    fs,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use thiserror::Error;
use tracing::debug;
use url::Url;
use walk_core::{
    RouteDefinition, TeamSizeBounds, TopologyError,
    domain::MembershipPolicy,
    topology::builtin_routes,
};
use walk_model::RouteId;

use crate::{
    models::{
        AdminConfig, Config, ConfigMetadata, DEFAULT_HOST, DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT,
        DatabaseConfig, NotificationConfig, RedisConfig, ScannerConfig, ServerConfig,
    },
    sources::{EnvConfig, FileConfig, FileRouteConfig},
    validation::{ConfigWarnings, collect_warnings},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> =
    Lazy::new(|| vec![PathBuf::from("walk.toml"), PathBuf::from("config/walk.toml")]);

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    /// Use these values instead of reading the process environment.
    pub env: Option<EnvConfig>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("config file {path} does not exist")]
    MissingConfig { path: PathBuf },
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid database url")]
    InvalidDatabaseUrl {
        #[source]
        source: url::ParseError,
    },
    #[error("invalid notification webhook url")]
    InvalidWebhookUrl {
        #[source]
        source: url::ParseError,
    },
    #[error("invalid route configuration")]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.options.env = Some(env);
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(|err| match err {
                dotenvy::Error::Io(_) => Ok(false),
                _ => Err(err),
            })?,
            None => dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                dotenvy::Error::Io(_) => Ok(false),
                _ => Err(err),
            })?,
        };

        let env = self.options.env.clone().unwrap_or_else(EnvConfig::gather);
        let (file_config, config_path) = self.load_file_config(&env)?;
        let config = compose_config(file_config, env, config_path, env_file_loaded)?;

        // Fail fast on a broken route table.
        config.topology()?;

        let mut warnings = ConfigWarnings::default();
        if config.metadata.config_path.is_none() {
            warnings.push_with_hint(
                "No walk.toml detected; using environment variables and built-in routes",
                "Create walk.toml or point WALK_CONFIG_PATH at one",
            );
        }
        warnings.extend(collect_warnings(&config));

        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(found) => found.clone(),
                None => return Ok((None, None)),
            },
        };

        debug!(path = %path.display(), "reading walk config");
        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents = fs::read_to_string(path).map_err(|err| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source: err,
    })?;
    toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source: err,
    })
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    config_path: Option<PathBuf>,
    env_file_loaded: bool,
) -> Result<Config, ConfigLoadError> {
    let FileConfig {
        server: file_server,
        database: file_database,
        redis: file_redis,
        admin: file_admin,
        membership: file_membership,
        scanner: file_scanner,
        notifications: file_notifications,
        routes: file_routes,
    } = file_config.unwrap_or_default();

    let server = ServerConfig {
        host: env
            .server_host
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: env.server_port.or(file_server.port).unwrap_or(DEFAULT_PORT),
    };

    let database_url = env
        .database_url
        .or(file_database.url)
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty());
    if let Some(url) = &database_url {
        Url::parse(url).map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;
    }
    let database = DatabaseConfig {
        url: database_url,
        max_connections: file_database
            .max_connections
            .unwrap_or(DEFAULT_MAX_CONNECTIONS),
    };

    let redis = env
        .redis_url
        .map(|url| RedisConfig { url })
        .or_else(|| file_redis.map(|r| RedisConfig { url: r.url }));

    let admin = AdminConfig {
        secret: env.admin_secret.or(file_admin.secret),
    };

    let membership = MembershipPolicy {
        floor: file_membership.floor_policy.unwrap_or_default(),
    };

    let scanner = ScannerConfig {
        default_threshold_minutes: env
            .threshold_minutes
            .or(file_scanner.default_threshold_minutes)
            .unwrap_or(ScannerConfig::default().default_threshold_minutes),
    };

    let webhook = env
        .notify_webhook
        .or(file_notifications.webhook)
        .map(|raw| Url::parse(&raw))
        .transpose()
        .map_err(|source| ConfigLoadError::InvalidWebhookUrl { source })?;
    let notifications = NotificationConfig { webhook };

    let builtin = file_routes.is_empty();
    let routes = if builtin {
        builtin_routes()
    } else {
        file_routes.into_iter().map(route_definition).collect()
    };

    Ok(Config {
        server,
        database,
        redis,
        admin,
        membership,
        scanner,
        notifications,
        routes,
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded,
            builtin_routes: builtin,
        },
    })
}

fn route_definition(route: FileRouteConfig) -> RouteDefinition {
    let defaults = TeamSizeBounds::default();
    RouteDefinition {
        id: RouteId(route.id),
        name: route.name,
        waypoints: route.waypoints,
        team_size: TeamSizeBounds {
            min: route.min_team_size.unwrap_or(defaults.min),
            max: route.max_team_size.unwrap_or(defaults.max),
        },
    }
}
