use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use super::common::success_response;
use crate::errors::ServiceError;
use crate::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct AlertQuery {
    /// Filter by seen status
    pub seen: Option<bool>,
    pub limit: Option<u64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_alerts))
        .route("/unread-count", get(unread_count))
        .route("/mark-all-read", put(mark_all_read))
        .route("/:id/mark-read", put(mark_read))
}

/// List alerts, unseen first, with the global unread count
#[utoipa::path(
    get,
    path = "/api/alerts",
    params(AlertQuery),
    responses(
        (status = 200, description = "Alert page returned", body = crate::services::alerts::AlertPage),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    tag = "alerts"
)]
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state.services.alerts.list(query.seen, query.limit).await?;
    Ok(success_response(page))
}

/// Mark one alert as read
#[utoipa::path(
    put,
    path = "/api/alerts/{id}/mark-read",
    params(("id" = i32, Path, description = "Alert id")),
    responses(
        (status = 200, description = "Alert marked as read"),
        (status = 404, description = "Alert not found", body = crate::errors::ErrorResponse),
    ),
    tag = "alerts"
)]
pub async fn mark_read(
    State(state): State<AppState>,
    Path(alert_id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let alert = state.services.alerts.mark_read(alert_id).await?;
    Ok(success_response(json!({
        "message": "Alert marked as read",
        "alert": alert,
    })))
}

/// Mark every unseen alert as read; returns how many transitioned
#[utoipa::path(
    put,
    path = "/api/alerts/mark-all-read",
    responses(
        (status = 200, description = "All alerts marked as read"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    tag = "alerts"
)]
pub async fn mark_all_read(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let count = state.services.alerts.mark_all_read().await?;
    Ok(success_response(json!({
        "message": "All alerts marked as read",
        "count": count,
    })))
}

/// Count of unseen alerts
#[utoipa::path(
    get,
    path = "/api/alerts/unread-count",
    responses(
        (status = 200, description = "Unread count returned"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    tag = "alerts"
)]
pub async fn unread_count(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let count = state.services.alerts.unread_count().await?;
    Ok(success_response(json!({ "unread_count": count })))
}
