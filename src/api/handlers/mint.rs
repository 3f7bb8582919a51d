//! Minting handlers.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};

use crate::api::state::AppState;
use crate::domain::{ApiResponse, Capacity, ConfigOverrides, MintRequest, MintResponse};
use crate::error::{AppError, Result};

/// Mint identifiers using the active configuration plus request overrides.
///
/// # Errors
///
/// Returns an error if the body cannot be decoded, the amount or
/// configuration is invalid, the space is exhausted, or storage fails.
pub async fn mint(
    State(state): State<AppState>,
    request: std::result::Result<Json<MintRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<MintResponse>>> {
    let Json(request) = request.map_err(|e| AppError::BadRequest(e.body_text()))?;
    request.check_fields()?;
    let amount = request.validated_amount(state.allocator.settings().max_batch)?;

    let active = state.allocator.active_configuration().await?;
    let configuration = request.overrides.apply(&active);

    let identifiers = state.allocator.mint(&configuration, amount).await?;

    Ok(Json(ApiResponse::success(MintResponse::new(identifiers))))
}

/// Capacity of the active configuration, with optional query overrides.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or storage fails.
pub async fn capacity(
    State(state): State<AppState>,
    Query(overrides): Query<ConfigOverrides>,
) -> Result<Json<ApiResponse<Capacity>>> {
    let active = state.allocator.active_configuration().await?;
    let configuration = overrides.apply(&active);

    let capacity = state.allocator.capacity(&configuration).await?;

    Ok(Json(ApiResponse::success(capacity)))
}
