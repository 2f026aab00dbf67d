use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::common::{created_response, success_response, validate_input};
use crate::auth::AuthUser;
use crate::entities::stock_transaction::Movement;
use crate::errors::ServiceError;
use crate::services::stock_ledger::{MovementFilters, MovementView, RecordMovementInput};
use crate::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StockMovementRequest {
    pub part_id: i32,
    pub quantity: i32,
    pub notes: Option<String>,
    pub machine: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TransactionQuery {
    pub part_id: Option<i32>,
    pub user_id: Option<i32>,
    /// "IN" or "OUT" (case-insensitive)
    #[serde(rename = "type")]
    pub movement: Option<String>,
    /// Case-insensitive substring match on the machine field
    pub machine: Option<String>,
    /// Inclusive RFC 3339 lower bound
    pub start_date: Option<String>,
    /// Inclusive RFC 3339 upper bound
    pub end_date: Option<String>,
    pub limit: Option<u64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transactions))
        .route("/in", post(stock_in))
        .route("/out", post(stock_out))
}

/// Add stock (IN movement)
#[utoipa::path(
    post,
    path = "/api/transactions/in",
    request_body = StockMovementRequest,
    responses(
        (status = 201, description = "Stock added"),
        (status = 400, description = "Invalid quantity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Part not found", body = crate::errors::ErrorResponse),
    ),
    tag = "transactions"
)]
pub async fn stock_in(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<StockMovementRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    record(state, user, Movement::In, payload, "Stock added successfully").await
}

/// Remove stock (OUT movement); may raise a low-stock alert
#[utoipa::path(
    post,
    path = "/api/transactions/out",
    request_body = StockMovementRequest,
    responses(
        (status = 201, description = "Stock removed"),
        (status = 400, description = "Invalid quantity or insufficient stock", body = crate::errors::ErrorResponse),
        (status = 404, description = "Part not found", body = crate::errors::ErrorResponse),
    ),
    tag = "transactions"
)]
pub async fn stock_out(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<StockMovementRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    record(state, user, Movement::Out, payload, "Stock removed successfully").await
}

async fn record(
    state: AppState,
    user: AuthUser,
    movement: Movement,
    payload: StockMovementRequest,
    message: &str,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let (transaction, part) = state
        .services
        .ledger
        .record_movement(
            user.id,
            RecordMovementInput {
                part_id: payload.part_id,
                movement,
                quantity: payload.quantity,
                machine: payload.machine.filter(|m| !m.trim().is_empty()),
                notes: payload.notes.filter(|n| !n.trim().is_empty()),
            },
        )
        .await?;

    let part_view = state.services.parts.get(part.id).await?;
    let view = MovementView {
        id: transaction.id,
        user_id: transaction.user_id,
        user_name: Some(user.username),
        part_id: transaction.part_id,
        part_name: Some(part.name),
        movement: transaction.movement,
        quantity: transaction.quantity,
        machine: transaction.machine,
        notes: transaction.notes,
        timestamp: transaction.created_at,
    };

    Ok(created_response(json!({
        "message": message,
        "transaction": view,
        "part": part_view,
    })))
}

/// List ledger entries with optional filters, newest first
#[utoipa::path(
    get,
    path = "/api/transactions",
    params(TransactionQuery),
    responses(
        (status = 200, description = "Transaction list returned"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    tag = "transactions"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let movement = query
        .movement
        .as_deref()
        .and_then(|raw| Movement::from_str(&raw.to_uppercase()));

    let filters = MovementFilters {
        part_id: query.part_id,
        user_id: query.user_id,
        movement,
        machine: query.machine,
        start_date: parse_bound(query.start_date.as_deref()),
        end_date: parse_bound(query.end_date.as_deref()),
        limit: query.limit,
    };

    let transactions = state.services.ledger.list_movements(filters).await?;

    Ok(success_response(json!({
        "total": transactions.len(),
        "transactions": transactions,
    })))
}

/// Unparseable bounds are ignored rather than rejected, matching the
/// tolerant filter behavior of the listing contract.
fn parse_bound(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
