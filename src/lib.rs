//! # PID Minter
//!
//! A persistent identifier minting service. Identifiers are a fixed prefix
//! followed by a root whose every position draws from its own alphabet
//! (digits, lowercase, uppercase, mixed case or extended). Two strategies are
//! supported:
//!
//! - **Sequential**: dense enumeration of the space, resuming where the last
//!   batch stopped
//! - **Random**: uniform draws per position, stepping through the space on
//!   collision
//!
//! Every minted identifier is unique across the life of the store.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                             PID Minter                               │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐  ┌──────────────┐  ┌─────────────┐  ┌────────────┐  │
//! │  │  API Layer  │  │  Allocator   │  │   Storage   │  │   Domain   │  │
//! │  │   (Axum)    │→ │ cache · gate │→ │ file/memory │  │   Models   │  │
//! │  └─────────────┘  └──────────────┘  └─────────────┘  └────────────┘  │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod storage;

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::api::create_router;
use crate::api::state::AppState;
use crate::config::AppConfig;
use crate::storage::create_storage;

/// Run the PID minter service.
///
/// This function:
/// 1. Initializes logging and the metrics recorder
/// 2. Initializes the storage backend
/// 3. Creates the allocator
/// 4. Starts the HTTP server
/// 5. Handles graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - The metrics recorder cannot be installed
/// - Storage backend fails to initialize
/// - HTTP server fails to bind
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    init_logging(&config);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting PID minter");

    let storage = create_storage(&config.storage).await?;

    let mut state = AppState::new(Arc::new(config.clone()), storage);
    if config.observability.metrics_enabled {
        let handle = PrometheusBuilder::new().install_recorder()?;
        state = state.with_metrics(handle);
    }

    let active = state.allocator.active_configuration().await?;
    info!(
        prefix = %active.prefix,
        strategy = %active.strategy(),
        "Active configuration loaded"
    );

    let app = create_router(state);

    let addr = config.server.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize logging based on configuration.
fn init_logging(config: &AppConfig) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.observability.log_format == "json" {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
