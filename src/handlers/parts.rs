use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::common::{created_response, success_response, validate_input};
use crate::errors::ServiceError;
use crate::qrcodes;
use crate::services::parts::{CreatePartInput, PartFilters, UpdatePartInput};
use crate::AppState;

const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

fn default_min_quantity() -> i32 {
    10
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePartRequest {
    #[validate(length(min = 1, max = 200, message = "Part name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default = "default_min_quantity")]
    pub min_quantity: i32,
    pub location: Option<String>,
    pub category: Option<String>,
    pub supplier_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePartRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
    pub min_quantity: Option<i32>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub supplier_id: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PartQuery {
    /// Case-insensitive substring over name and description
    pub search: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub low_stock: Option<bool>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_parts).post(create_part))
        .route(
            "/:id",
            get(get_part).put(update_part).delete(delete_part),
        )
        .route("/:id/qrcode", get(get_qr_code))
        .route("/:id/image", post(upload_part_image))
}

/// List spare parts with optional filters, ordered by name
#[utoipa::path(
    get,
    path = "/api/parts",
    params(PartQuery),
    responses(
        (status = 200, description = "Part list returned"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    tag = "parts"
)]
pub async fn list_parts(
    State(state): State<AppState>,
    Query(query): Query<PartQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let parts = state
        .services
        .parts
        .list(PartFilters {
            search: query.search,
            category: query.category,
            location: query.location,
            low_stock: query.low_stock,
        })
        .await?;

    Ok(success_response(json!({
        "total": parts.len(),
        "parts": parts,
    })))
}

/// Get a single part by id
#[utoipa::path(
    get,
    path = "/api/parts/{id}",
    params(("id" = i32, Path, description = "Part id")),
    responses(
        (status = 200, description = "Part returned"),
        (status = 404, description = "Part not found", body = crate::errors::ErrorResponse),
    ),
    tag = "parts"
)]
pub async fn get_part(
    State(state): State<AppState>,
    Path(part_id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let part = state.services.parts.get(part_id).await?;
    Ok(success_response(json!({ "part": part })))
}

/// Create a new spare part
#[utoipa::path(
    post,
    path = "/api/parts",
    request_body = CreatePartRequest,
    responses(
        (status = 201, description = "Part created"),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
    ),
    tag = "parts"
)]
pub async fn create_part(
    State(state): State<AppState>,
    Json(payload): Json<CreatePartRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let part = state
        .services
        .parts
        .create(CreatePartInput {
            name: payload.name,
            description: payload.description,
            quantity: payload.quantity,
            min_quantity: payload.min_quantity,
            location: payload.location,
            category: payload.category,
            supplier_id: payload.supplier_id,
        })
        .await?;

    Ok(created_response(json!({
        "message": "Part created successfully",
        "part": part,
    })))
}

/// Update an existing spare part
#[utoipa::path(
    put,
    path = "/api/parts/{id}",
    params(("id" = i32, Path, description = "Part id")),
    request_body = UpdatePartRequest,
    responses(
        (status = 200, description = "Part updated"),
        (status = 404, description = "Part not found", body = crate::errors::ErrorResponse),
    ),
    tag = "parts"
)]
pub async fn update_part(
    State(state): State<AppState>,
    Path(part_id): Path<i32>,
    Json(payload): Json<UpdatePartRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let part = state
        .services
        .parts
        .update(
            part_id,
            UpdatePartInput {
                name: payload.name,
                description: payload.description,
                quantity: payload.quantity,
                min_quantity: payload.min_quantity,
                location: payload.location,
                category: payload.category,
                supplier_id: payload.supplier_id.map(Some),
            },
        )
        .await?;

    Ok(success_response(json!({
        "message": "Part updated successfully",
        "part": part,
    })))
}

/// Delete a spare part and cascade its transactions and alerts
#[utoipa::path(
    delete,
    path = "/api/parts/{id}",
    params(("id" = i32, Path, description = "Part id")),
    responses(
        (status = 200, description = "Part deleted"),
        (status = 404, description = "Part not found", body = crate::errors::ErrorResponse),
    ),
    tag = "parts"
)]
pub async fn delete_part(
    State(state): State<AppState>,
    Path(part_id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.parts.delete(part_id).await?;
    Ok(success_response(json!({
        "message": "Part deleted successfully",
    })))
}

/// Return the QR payload for a part; rendering is a collaborator concern
#[utoipa::path(
    get,
    path = "/api/parts/{id}/qrcode",
    params(("id" = i32, Path, description = "Part id")),
    responses(
        (status = 200, description = "QR payload returned"),
        (status = 404, description = "Part not found", body = crate::errors::ErrorResponse),
    ),
    tag = "parts"
)]
pub async fn get_qr_code(
    State(state): State<AppState>,
    Path(part_id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let part = state.services.parts.get(part_id).await?;

    Ok(success_response(json!({
        "part_id": part.id,
        "part_name": part.name,
        "qr_payload": qrcodes::qr_payload(part.id),
        "qr_code_url": part.qr_code_url,
    })))
}

/// Attach an uploaded image to a part (multipart field "image")
async fn upload_part_image(
    State(state): State<AppState>,
    Path(part_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    // Touch the part first so a bad id fails before any file is written.
    state.services.parts.get_model(part_id).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::ValidationError(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let original_name = field
            .file_name()
            .map(sanitize_filename)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                ServiceError::ValidationError("Image filename is required".to_string())
            })?;

        let extension = original_name
            .rsplit('.')
            .next()
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ServiceError::ValidationError(format!(
                "File type not allowed: {}",
                extension
            )));
        }

        let data = field.bytes().await.map_err(|e| {
            ServiceError::ValidationError(format!("Failed to read upload: {}", e))
        })?;

        let stored_name = format!("{}_{}", Utc::now().timestamp(), original_name);
        let upload_dir = std::path::Path::new(&state.config.upload_dir);
        tokio::fs::create_dir_all(upload_dir)
            .await
            .map_err(|e| ServiceError::InternalError(format!("upload dir: {}", e)))?;
        tokio::fs::write(upload_dir.join(&stored_name), &data)
            .await
            .map_err(|e| ServiceError::InternalError(format!("storing upload: {}", e)))?;

        let part = state
            .services
            .parts
            .set_image(part_id, format!("/uploads/{}", stored_name))
            .await?;

        return Ok(success_response(json!({
            "message": "Image uploaded successfully",
            "part": part,
        })));
    }

    Err(ServiceError::ValidationError(
        "Multipart field 'image' is required".to_string(),
    ))
}

/// Strip path components and shell-unfriendly characters from an uploaded
/// filename.
fn sanitize_filename(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_matches('.')
        .to_string()
}
