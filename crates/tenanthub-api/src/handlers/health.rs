//! Health check handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let (status, store) = match state.store.health_check().await {
        Ok(true) => (StatusCode::OK, "connected"),
        Ok(false) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
        Err(e) => {
            warn!(error = %e, "Store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    let body = HealthResponse {
        status: if status.is_success() { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: store.to_string(),
        scoped_entities: state
            .registry
            .entities()
            .into_iter()
            .map(String::from)
            .collect(),
    };

    (status, Json(ApiResponse::ok(body)))
}
