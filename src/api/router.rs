//! Router setup and configuration.

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{config, health, mint};
use crate::api::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let mut health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready));

    if state.config.observability.metrics_enabled {
        health_routes =
            health_routes.route(&state.config.observability.metrics_path, get(health::metrics));
    }

    let minter_routes = Router::new()
        .route("/config", get(config::get_config).put(config::put_config))
        .route("/mint", post(mint::mint))
        .route("/capacity", get(mint::capacity));

    Router::new()
        .merge(health_routes)
        .nest("/v1", minter_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::config::AppConfig;
    use crate::storage::MemoryStorage;

    fn router(metrics_enabled: bool) -> Router {
        let mut config = AppConfig::default();
        config.observability.metrics_enabled = metrics_enabled;
        create_router(AppState::new(
            Arc::new(config),
            Arc::new(MemoryStorage::new()),
        ))
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let response = router(false)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_metrics_route_follows_config() {
        let response = router(false)
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Enabled but no recorder attached.
        let response = router(true)
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_mint_route() {
        let response = router(false)
            .oneshot(
                Request::post("/v1/mint")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"amount": 2, "char_map": "d"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
