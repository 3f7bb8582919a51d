//! Application state for Axum handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::AppConfig;
use crate::service::Allocator;
use crate::storage::traits::Storage;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Storage backend.
    pub storage: Arc<dyn Storage>,
    /// Identifier allocator.
    pub allocator: Arc<Allocator>,
    /// Prometheus handle, when metrics are enabled.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(config: Arc<AppConfig>, storage: Arc<dyn Storage>) -> Self {
        let allocator = Arc::new(Allocator::new(
            Arc::clone(&storage),
            config.minter.clone(),
        ));

        Self {
            config,
            storage,
            allocator,
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for the metrics endpoint.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
