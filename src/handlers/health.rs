use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

use crate::db;
use crate::errors::ServiceError;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
}

/// Liveness probe
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "up",
        "service": "stockroom-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness probe; fails when the database is unreachable
async fn ready(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    db::ping_database(&state.db).await?;
    Ok(Json(json!({ "status": "ready" })))
}
