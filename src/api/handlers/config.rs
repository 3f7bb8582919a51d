//! Active configuration handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::api::state::AppState;
use crate::domain::{ApiResponse, MintConfiguration};
use crate::error::{AppError, Result};

/// Get the active mint configuration.
///
/// # Errors
///
/// Returns an error if the stored configuration cannot be read.
pub async fn get_config(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<MintConfiguration>>> {
    let config = state.allocator.active_configuration().await?;
    Ok(Json(ApiResponse::success(config)))
}

/// Validate and replace the active mint configuration.
///
/// # Errors
///
/// Returns an error if the body cannot be decoded, the configuration is
/// invalid, or it cannot be stored.
pub async fn put_config(
    State(state): State<AppState>,
    config: std::result::Result<Json<MintConfiguration>, JsonRejection>,
) -> Result<Json<ApiResponse<MintConfiguration>>> {
    let Json(config) = config.map_err(|e| AppError::BadRequest(e.body_text()))?;
    state.allocator.replace_active_configuration(&config).await?;
    Ok(Json(ApiResponse::success(config)))
}
