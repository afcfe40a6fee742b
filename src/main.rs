//! ==============================================================================
//! main.rs - plant collector entry point
//! ==============================================================================
//!
//! purpose:
//!     the hub that plant sensor nodes post to. every node sends a flat json
//!     reading about once a minute; the collector stamps it, appends it to
//!     today's log file and keeps the last readings in memory for the
//!     /latest and /stats queries.
//!
//! responsibilities:
//!     - load configuration (collector.toml + COLLECTOR_* overrides)
//!     - initialize tracing
//!     - create the data directory and the ingest service
//!     - serve http until ctrl+c
//!
//! relationships:
//!     - uses: config.rs (settings), service.rs (state), api.rs (router)
//!
//! architecture:
//!
//!     ┌─────────────┐   POST /plant_data   ┌──────────────────────────────┐
//!     │ sensor node │ ───────────────────► │        plant collector       │
//!     │ (soil, rgb) │                      │  ┌────────┐   ┌───────────┐  │
//!     └─────────────┘                      │  │ window │   │ daily log │  │
//!                                          │  │ (100)  │   │  .jsonl   │  │
//!     ┌─────────────┐   GET /latest        │  └────────┘   └───────────┘  │
//!     │  display /  │ ◄─────────────────── │        one rwlock            │
//!     │  dashboard  │   GET /stats         └──────────────────────────────┘
//!     └─────────────┘
//!
//! ==============================================================================

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use plant_collector::api;
use plant_collector::config::{CollectorConfig, ConfigOrigin};
use plant_collector::service::IngestService;

#[tokio::main]
async fn main() -> Result<()> {
    // step 1: load configuration
    let (mut config, origin) = CollectorConfig::load_or_default();
    config.apply_env_overrides()?;
    config.validate()?;

    // step 2: logging (RUST_LOG wins over the configured level)
    let (filter, level_error) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, None),
        Err(_) => match config.logging.env_filter() {
            Ok(filter) => (filter, None),
            Err(e) => (EnvFilter::new("info"), Some(e)),
        },
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Plant Collector v{} starting", env!("CARGO_PKG_VERSION"));
    if let Some(e) = level_error {
        warn!("{} - logging at info", e);
    }
    match origin {
        ConfigOrigin::File(path) => info!("config loaded from {}", path.display()),
        ConfigOrigin::Fallback { path, error } => {
            warn!("failed to load {}: {} - using defaults", path.display(), error)
        }
        ConfigOrigin::Defaults => warn!("no config file found - using defaults"),
    }

    // step 3: storage + shared state
    let service = IngestService::new(&config.storage)
        .await
        .with_context(|| format!("failed to create data directory {}", config.storage.data_dir.display()))?
        .with_sensor_logging(config.logging.show_sensor_data);
    info!(
        "data directory: {} (keeping last {} readings in memory)",
        service.data_dir().await.display(),
        service.capacity().await
    );

    // step 4: serve
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("listening on http://{}", addr);

    axum::serve(listener, api::router(Arc::new(service)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("collector stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl+c: {}", e);
        // without a signal handler, run until killed
        std::future::pending::<()>().await;
    }
    info!("received ctrl+c, shutting down");
}
