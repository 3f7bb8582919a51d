//! Health check and metrics handlers.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::state::AppState;
use crate::domain::{ApiResponse, HealthResponse, ReadyComponents, ReadyResponse};
use crate::error::{AppError, ErrorCode, Result};

/// Liveness probe - always returns 200 if the service is running.
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// Readiness probe - checks if the service can serve requests.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<ReadyResponse>>) {
    let storage_ok = match state.storage.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                backend = state.storage.backend_name(),
                error = %e,
                "Storage health check failed"
            );
            false
        }
    };

    let data = ReadyResponse {
        ready: storage_ok,
        components: ReadyComponents {
            storage: storage_ok,
        },
    };

    if storage_ok {
        (StatusCode::OK, Json(ApiResponse::success(data)))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                code: ErrorCode::SERVICE_UNAVAILABLE.as_i32(),
                message: "service unavailable".to_string(),
                data: Some(data),
            }),
        )
    }
}

/// Prometheus metrics endpoint.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] when no metrics recorder is installed.
pub async fn metrics(State(state): State<AppState>) -> Result<String> {
    state
        .metrics
        .as_ref()
        .map(metrics_exporter_prometheus::PrometheusHandle::render)
        .ok_or_else(|| AppError::NotFound("metrics are disabled".to_string()))
}
