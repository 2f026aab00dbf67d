use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::common::{created_response, success_response};
use crate::errors::ServiceError;
use crate::services::suppliers::{CreateSupplierInput, UpdateSupplierInput};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSupplierRequest {
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateSupplierRequest {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route(
            "/:id",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
}

async fn list_suppliers(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let suppliers = state.services.suppliers.list().await?;
    Ok(success_response(json!({
        "total": suppliers.len(),
        "suppliers": suppliers,
    })))
}

async fn get_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let supplier = state.services.suppliers.get(supplier_id).await?;
    Ok(success_response(supplier))
}

async fn create_supplier(
    State(state): State<AppState>,
    Json(payload): Json<CreateSupplierRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let supplier = state
        .services
        .suppliers
        .create(CreateSupplierInput {
            name: payload.name,
            contact_person: payload.contact_person,
            email: payload.email,
            phone: payload.phone,
            address: payload.address,
        })
        .await?;

    Ok(created_response(json!({
        "message": "Supplier added successfully",
        "supplier": supplier,
    })))
}

async fn update_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<i32>,
    Json(payload): Json<UpdateSupplierRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let supplier = state
        .services
        .suppliers
        .update(
            supplier_id,
            UpdateSupplierInput {
                name: payload.name,
                contact_person: payload.contact_person,
                email: payload.email,
                phone: payload.phone,
                address: payload.address,
            },
        )
        .await?;

    Ok(success_response(json!({
        "message": "Supplier updated successfully",
        "supplier": supplier,
    })))
}

async fn delete_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.suppliers.delete(supplier_id).await?;
    Ok(success_response(json!({
        "message": "Supplier deleted successfully",
    })))
}
