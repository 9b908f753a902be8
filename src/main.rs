//! Notebook server (development binary).
//!
//! Serves the contents REST surface from an in-memory store and runs a drive
//! bridge over the same store.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (axum fallback)
//!                         │
//!                         ▼
//!                     routing::Router ──▶ routes::* handlers ──┐
//!                                                              ▼
//!                                                   services::MemoryContents
//!                                                              ▲
//!     POST /api/drive.v1                                       │
//!     ──────────────▶ DriveClient ──▶ drive::DriveBridge ──────┘
//!
//!     Cross-cutting: config, observability, lifecycle
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use lite_server::config::{load_config, ServerConfig};
use lite_server::drive::{self, DriveBridge, DriveClient};
use lite_server::lifecycle::signals::spawn_signal_handler;
use lite_server::observability::{logging, metrics};
use lite_server::routes::{register_all, Services};
use lite_server::services::{Contents, MemoryContents};
use lite_server::{HttpServer, Router, Shutdown};

#[derive(Debug, Parser)]
#[command(name = "lite-server", version, about = "In-memory notebook contents server")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    logging::init_logging(&config.observability)?;
    tracing::info!("lite-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        mount_prefix = %config.drive.mount_prefix,
        max_body_bytes = config.limits.max_body_bytes,
        request_timeout_secs = config.limits.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let contents: Arc<dyn Contents> = Arc::new(MemoryContents::with_max_checkpoints(
        config.contents.max_checkpoints,
    ));

    let (bridge_endpoint, client_endpoint) = drive::channel(config.drive.channel_capacity);
    let bridge = Arc::new(DriveBridge::new(
        Arc::clone(&contents),
        config.drive.mount_prefix.clone(),
    ))
    .start(bridge_endpoint);

    let services = Services::new()
        .with_contents(Arc::clone(&contents))
        .with_drive(Arc::new(DriveClient::new(client_endpoint)));
    let mut router = Router::new();
    register_all(&mut router, &services)?;
    let router = Arc::new(router);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    HttpServer::new(&config.limits, router)
        .run(listener, shutdown)
        .await?;
    bridge.stop().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
