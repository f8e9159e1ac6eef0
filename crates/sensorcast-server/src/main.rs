//! Sensorcast server binary.
//!
//! Wires configuration, logging, the store, the persistence gateway and
//! the real-time server together, then serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `sensorcast.yaml` plus environment overrides
//! 2. Initialize structured logging (tracing)
//! 3. Open the store (in-memory, or `PostgreSQL` with table bootstrap)
//! 4. Seed fixtures into an empty store, if enabled
//! 5. Build the gateway, dispatcher and shared state
//! 6. Serve until `Ctrl-C`, then close the pool

mod config;
mod error;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use sensorcast_db::{
    DocumentStore, MemoryStore, PersistenceGateway, PostgresConfig, PostgresPool, seed_fixtures,
};
use sensorcast_realtime::{AppState, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, LogFormat, LoggingConfig, StorageBackend, StorageConfig};
use crate::error::AppError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the server fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()
        .map_err(AppError::from)
        .context("loading configuration")?;

    init_tracing(&config.logging)?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        backend = ?config.storage.backend,
        "sensorcast-server starting"
    );

    let (store, pool) = open_store(&config.storage)
        .await
        .context("opening store")?;

    if config.fixtures.seed {
        seed_fixtures(store.as_ref())
            .await
            .map_err(AppError::from)
            .context("seeding fixtures")?;
    }

    let gateway = PersistenceGateway::new(store);
    let state = Arc::new(AppState::with_capacity(
        gateway,
        config.server.broadcast_capacity,
    ));

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let served = sensorcast_realtime::start_server(&server_config, state, shutdown_signal())
        .await
        .map_err(AppError::from);

    if let Some(pool) = pool {
        pool.close().await;
    }

    served.context("running server")?;
    info!("sensorcast-server stopped");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| AppError::Logging {
            message: format!("invalid log level {:?}: {e}", logging.level),
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };

    installed.map_err(|e| AppError::Logging {
        message: e.to_string(),
    })
}

/// Open the configured store.
///
/// Returns the pool separately for `PostgreSQL` so it can be closed on
/// shutdown.
async fn open_store(
    storage: &StorageConfig,
) -> Result<(Arc<dyn DocumentStore>, Option<PostgresPool>), AppError> {
    match storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory store");
            Ok((Arc::new(MemoryStore::new()), None))
        }
        StorageBackend::Postgres => {
            let pg_config = PostgresConfig::new(&storage.postgres_url)
                .with_max_connections(storage.max_connections)
                .with_connect_timeout(Duration::from_secs(storage.connect_timeout_secs));
            let pool = PostgresPool::connect(&pg_config).await?;
            pool.ensure_schema().await?;
            Ok((Arc::new(pool.clone()), Some(pool)))
        }
    }
}

/// Resolve when the process receives `Ctrl-C`.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {e}"),
    }
}
