//! # Walk Server
//!
//! Coordinates a charity walk: station staff scan teams through the route's
//! waypoints, captains manage their team, and operators pull roster reports
//! of stalled and no-show teams.
//!
//! Progress lives in PostgreSQL (or in memory when no database is
//! configured), the matching submission set in Redis.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use walk_config::{Config, ConfigLoad, ConfigLoader, ConfigLoaderOptions};
use walk_core::{
    WalkPorts, WalkServices,
    infrastructure::{
        InMemorySubmissionRegistry, InMemoryWalkStore, LogNotifier, PostgresWalkStore,
        RedisSubmissionRegistry, WebhookNotifier,
    },
    ports::{Notifier, ScopedRouteAuthority, SubmissionRegistry, SystemClock, WalkStore},
};
use walk_server::{AppState, create_app};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "walk-server")]
#[command(about = "Check-in and progress coordinator for a multi-route charity walk")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Path to walk.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to a .env file (defaults to ./.env when present)
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_runtime_config(&cli.serve)?;

    if let Some(Command::Migrate) = cli.command {
        return run_migrate(&config).await;
    }

    run_server(config).await
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Arc<Config>> {
    let ConfigLoad {
        mut config,
        warnings,
    } = ConfigLoader::with_options(ConfigLoaderOptions {
        config_path: args.config.clone(),
        env_file: args.env_file.clone(),
        env: None,
    })
    .load()
    .context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }

    for warning in warnings.iter() {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    info!(
        routes = config.routes.len(),
        builtin_routes = config.metadata.builtin_routes,
        floor_policy = ?config.membership.floor,
        scanner.default_threshold_minutes = config.scanner.default_threshold_minutes,
        "walk configuration in effect"
    );

    Ok(Arc::new(config))
}

async fn run_migrate(config: &Config) -> anyhow::Result<()> {
    let url = config
        .database
        .url
        .as_deref()
        .context("DATABASE_URL or [database].url is required to run migrations")?;
    let store = PostgresWalkStore::connect(url, config.database.max_connections)
        .await
        .context("failed to connect to PostgreSQL for migration")?;
    store
        .migrate()
        .await
        .context("database migration failed")?;
    info!("Database migrations applied successfully");
    Ok(())
}

async fn wire_ports(config: &Config) -> anyhow::Result<WalkPorts> {
    let store: Arc<dyn WalkStore> = match config.database.url.as_deref() {
        Some(url) => {
            let store = PostgresWalkStore::connect(url, config.database.max_connections)
                .await
                .context("failed to connect to PostgreSQL")?;
            store.migrate().await.context("database migration failed")?;
            info!("Connected to PostgreSQL");
            Arc::new(store)
        }
        None => {
            warn!("Running with the in-memory store");
            Arc::new(InMemoryWalkStore::new())
        }
    };

    let submissions: Arc<dyn SubmissionRegistry> = match &config.redis {
        Some(redis) => {
            let registry = RedisSubmissionRegistry::connect(&redis.url)
                .await
                .context("failed to connect to Redis")?;
            info!("Connected to Redis submission registry");
            Arc::new(registry)
        }
        None => Arc::new(InMemorySubmissionRegistry::new()),
    };

    let notifier: Arc<dyn Notifier> = match &config.notifications.webhook {
        Some(endpoint) => {
            info!(endpoint = %endpoint, "notifications delivered via webhook");
            Arc::new(
                WebhookNotifier::new(endpoint.clone())
                    .context("failed to build notification client")?,
            )
        }
        None => Arc::new(LogNotifier),
    };

    Ok(WalkPorts {
        store,
        submissions,
        notifier,
        authority: Arc::new(ScopedRouteAuthority),
        clock: Arc::new(SystemClock),
    })
}

async fn run_server(config: Arc<Config>) -> anyhow::Result<()> {
    let topology = Arc::new(config.topology().context("invalid route configuration")?);
    let ports = wire_ports(&config).await?;
    let services = WalkServices::new(ports, topology, config.membership);
    let app = create_app(AppState::new(services, Arc::clone(&config)));

    let addr = config
        .server
        .socket_addr()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "walk server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("walk server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to install shutdown handler");
        std::future::pending::<()>().await;
    }
}
