//! Request handlers for the three operational endpoints: manual scrape
//! trigger, Prometheus scrape, and liveness.

use crate::errors::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use mediascout_types::run::Trigger;
use serde_json::json;
use uuid::Uuid;

/// `POST /scrape/brand/:brand_id` — starts a run without waiting for it
/// to finish. Returns 202 with the allocated run id, 409 if the brand is
/// already locked, 404 if the brand doesn't exist.
pub async fn scrape_brand(
    State(state): State<AppState>,
    Path(brand_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let run_id = state.coordinator.clone().try_start(brand_id, Trigger::Api).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "run_id": run_id.as_str(), "brand_id": brand_id })),
    ))
}

/// `GET /metrics` — Prometheus text exposition format.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.gather() {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to gather metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `GET /health` — 200 when the Store is reachable, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "unhealthy" }))).into_response()
        }
    }
}
