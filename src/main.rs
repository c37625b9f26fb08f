mod config;
mod entities;
mod http;
mod models;
mod notify;
mod rate_limit;
mod state;
mod storage;
mod utils;
mod validation;

use std::sync::Arc;
use std::time::Duration;

use crate::config::{ApiConfig, StorageBackend};
use crate::notify::EmailNotifier;
use crate::rate_limit::RateLimiter;
use crate::state::AppState;
use crate::storage::{DatabaseStore, FileStore, MemoryStore, SubmissionStore};
use anyhow::{Context, Result};
use axum::Router;
use migration::MigratorTrait;
use sea_orm::ConnectOptions;
use sea_orm::Database;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = ApiConfig::load().context("Failed to load configuration")?;

    let storage = build_storage(&config).await?;
    let notifier = Arc::new(EmailNotifier::new(
        config.email.clone(),
        &config.app.base_url,
    ));
    let rate_limiter = Arc::new(RateLimiter::new(
        config.rate_limit.max_submissions,
        config.rate_limit.max_clients,
        config.rate_limit.ttl(),
    ));

    let app_state = AppState::new(
        storage,
        notifier,
        rate_limiter,
        config.app.utc_offset_hours,
    );

    let listener = TcpListener::bind(config.server.address())
        .await
        .context("Failed to bind HTTP listener")?;
    let local_addr = listener
        .local_addr()
        .context("Failed to obtain listener address")?;
    info!("Door access log API listening on {local_addr}");

    let router: Router = http::router(app_state);
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server exited with error")?;

    Ok(())
}

fn init_tracing() {
    let default_filter = "info";
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    assert!(!filter.is_empty(), "Tracing filter must not be empty");
    assert!(filter.len() < 256, "Tracing filter length exceeds bounds");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .compact()
        .init();
}

async fn build_storage(config: &ApiConfig) -> Result<Arc<dyn SubmissionStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory submission store (records are lost on restart)");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::File => {
            info!(
                "Using file submission store in {}",
                config.storage.data_dir.display()
            );
            Ok(Arc::new(FileStore::new(&config.storage.data_dir)))
        }
        StorageBackend::Database => {
            let database = connect_database(config).await?;
            run_migrations(&database).await?;
            info!("Using database submission store");
            Ok(Arc::new(DatabaseStore::new(database)))
        }
    }
}

async fn connect_database(config: &ApiConfig) -> Result<sea_orm::DatabaseConnection> {
    let database_config = config
        .storage
        .database
        .as_ref()
        .context("Database backend selected but [storage.database] is missing")?;

    let mut options = ConnectOptions::new(database_config.url.clone());
    options
        .max_connections(database_config.max_connections)
        .sqlx_logging(true)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug)
        .acquire_timeout(Duration::from_secs(10));

    if let Some(min) = database_config.min_connections {
        options.min_connections(min);
    }

    Database::connect(options)
        .await
        .context("Failed to connect to PostgreSQL")
}

async fn run_migrations(database: &sea_orm::DatabaseConnection) -> Result<()> {
    migration::Migrator::up(database, None)
        .await
        .context("Database migrations failed")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
        return;
    }
    info!("Shutdown signal received");
}
