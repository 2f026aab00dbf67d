mod common;

use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use common::{json_body, TestApp};
use serde_json::json;

use stockroom_api::entities::user::UserRole;
use stockroom_api::errors::ServiceError;

#[tokio::test]
async fn login_round_trip() {
    let app = TestApp::new().await;

    let tokens = app.state.auth.login("admin", "admin123").await.unwrap();
    assert_eq!(tokens.user.username, "admin");
    assert!(tokens.user.is_admin());
    assert!(!tokens.access_token.is_empty());

    let err = app.state.auth.login("admin", "wrong").await.unwrap_err();
    assert_matches!(err, ServiceError::Unauthorized(_));

    let err = app.state.auth.login("ghost", "admin123").await.unwrap_err();
    assert_matches!(err, ServiceError::Unauthorized(_));
}

#[tokio::test]
async fn signup_assigns_technician_and_rejects_duplicates() {
    let app = TestApp::new().await;

    let tokens = app.state.auth.signup("sam", "pass1234").await.unwrap();
    assert_eq!(tokens.user.role, UserRole::Technician.as_str());

    let err = app.state.auth.signup("sam", "other").await.unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn register_endpoint_is_admin_gated() {
    let app = TestApp::new().await;

    // A technician token must not be able to create accounts.
    let tech = app.state.auth.signup("tech", "pass1234").await.unwrap();
    let response = app
        .request(
            Method::POST,
            "/api/auth/register",
            Some(json!({"username": "newbie", "password": "pw123456", "role": "technician"})),
            Some(&tech.access_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The admin can, and invalid roles are rejected.
    let body = json_body(
        app.request_authenticated(
            Method::POST,
            "/api/auth/register",
            Some(json!({"username": "newbie", "password": "pw123456", "role": "technician"})),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(body["user"]["username"], "newbie");
    assert_eq!(body["user"]["role"], "technician");

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/auth/register",
            Some(json!({"username": "x", "password": "pw123456", "role": "supervisor"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn protected_routes_reject_missing_and_garbage_tokens() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/parts", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(Method::GET, "/api/parts", None, Some("garbage"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_the_token_owner() {
    let app = TestApp::new().await;

    let body = json_body(
        app.request_authenticated(Method::GET, "/api/auth/me", None)
            .await,
        StatusCode::OK,
    )
    .await;

    assert_eq!(body["user"]["username"], "admin");
    assert_eq!(body["user"]["role"], "admin");
    assert!(
        body["user"].get("password_hash").is_none(),
        "password hash must never serialize"
    );
}
