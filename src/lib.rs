//! Stockroom API Library
//!
//! Backend for spare-part inventory tracking: parts, suppliers, an
//! append-only stock-movement ledger, and low-stock alerts.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod qrcodes;
pub mod services;

use axum::{middleware, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: services::AppServices,
    pub auth: Arc<auth::AuthService>,
}

/// Assemble the full application router.
///
/// Everything under `/api` is bearer-protected except the login and signup
/// endpoints; health probes and static files stay public.
pub fn app_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/api/auth", handlers::auth::protected_routes())
        .nest("/api/parts", handlers::parts::routes())
        .nest("/api/transactions", handlers::transactions::routes())
        .nest("/api/alerts", handlers::alerts::routes())
        .nest("/api/suppliers", handlers::suppliers::routes())
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth::require_auth,
        ));

    let public = Router::new()
        .nest("/api/auth", handlers::auth::public_routes())
        .merge(handlers::health::routes());

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .nest_service("/qrcodes", ServeDir::new(&state.config.qr_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .with_state(state)
}
