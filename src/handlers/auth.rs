use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::common::{created_response, success_response};
use crate::auth::AuthUser;
use crate::entities::user::UserRole;
use crate::errors::ServiceError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Routes reachable without a token
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/signup", post(signup))
}

/// Routes behind the auth middleware
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/me", get(me))
}

/// Authenticate a username/password pair and issue a bearer token
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ServiceError::ValidationError(
            "Username and password are required".to_string(),
        ));
    }

    let tokens = state.auth.login(&payload.username, &payload.password).await?;

    Ok(success_response(json!({
        "access_token": tokens.access_token,
        "user": tokens.user,
    })))
}

/// Public self-registration; the account is logged in immediately
async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let tokens = state.auth.signup(&payload.username, &payload.password).await?;

    info!(username = %tokens.user.username, "user signed up");

    Ok(created_response(json!({
        "message": "User registered successfully",
        "access_token": tokens.access_token,
        "user": tokens.user,
    })))
}

/// Admin-driven registration with an explicit role
async fn register(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    if !user.is_admin() {
        return Err(ServiceError::Forbidden("Admin access required".to_string()));
    }

    let role = match payload.role.as_deref() {
        None => UserRole::Technician,
        Some(raw) => UserRole::from_str(raw).ok_or_else(|| {
            ServiceError::ValidationError(
                "Invalid role. Must be admin or technician".to_string(),
            )
        })?,
    };

    let created = state
        .auth
        .register(&payload.username, &payload.password, role)
        .await?;

    info!(username = %created.username, role = %created.role, "user registered");

    Ok(created_response(json!({
        "message": "User created successfully",
        "user": created,
    })))
}

/// Return the authenticated user's account record
async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ServiceError> {
    let current = state.auth.current_user(user.id).await?;
    Ok(success_response(json!({ "user": current })))
}
