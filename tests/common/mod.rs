#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use stockroom_api::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db,
    entities::user::UserRole,
    errors::ServiceError,
    services::notifications::LowStockNotifier,
    services::AppServices,
    AppState,
};

/// One recorded notifier invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifiedLowStock {
    pub part_name: String,
    pub quantity: i32,
    pub min_quantity: i32,
    pub part_id: i32,
}

/// Notifier double that records every call and can be switched into a
/// failing mode to exercise the swallow-and-log path.
#[derive(Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<NotifiedLowStock>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn calls(&self) -> Vec<NotifiedLowStock> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl LowStockNotifier for RecordingNotifier {
    async fn notify_low_stock(
        &self,
        part_name: &str,
        quantity: i32,
        min_quantity: i32,
        part_id: i32,
    ) -> Result<bool, ServiceError> {
        self.calls.lock().unwrap().push(NotifiedLowStock {
            part_name: part_name.to_string(),
            quantity,
            min_quantity,
            part_id,
        });

        if self.fail.load(Ordering::SeqCst) {
            return Err(ServiceError::ExternalServiceError(
                "notification endpoint unreachable".to_string(),
            ));
        }
        Ok(true)
    }
}

/// Test harness: fresh temp-file SQLite database, migrated schema, seeded
/// admin account, and the full application router.
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub notifier: Arc<RecordingNotifier>,
    pub admin_token: String,
    pub admin_id: i32,
    _tmp: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let tmp = TempDir::new().expect("temp dir");
        let db_path = tmp.path().join("stockroom_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        // A single connection serializes writers; the ledger's guarded
        // update is what keeps interleavings correct, not the pool shape.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.upload_dir = tmp.path().join("uploads").display().to_string();
        cfg.qr_dir = tmp.path().join("qrcodes").display().to_string();

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let notifier = Arc::new(RecordingNotifier::default());

        let auth = Arc::new(AuthService::new(
            AuthConfig::new(cfg.jwt_secret.clone(), Duration::from_secs(3600)),
            db_arc.clone(),
        ));

        let services = AppServices::new(db_arc.clone(), notifier.clone());

        let state = AppState {
            db: db_arc,
            config: cfg,
            services,
            auth: auth.clone(),
        };

        let router = stockroom_api::app_router(state.clone());

        let admin = auth
            .register("admin", "admin123", UserRole::Admin)
            .await
            .expect("seed admin");
        let admin_token = auth.generate_token(&admin).expect("admin token");

        Self {
            state,
            router,
            notifier,
            admin_token,
            admin_id: admin.id,
            _tmp: tmp,
        }
    }

    /// Issue a request with an arbitrary token (or none)
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Issue a request as the seeded admin
    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response<Body> {
        self.request(method, uri, body, Some(&self.admin_token))
            .await
    }

    /// Convenience: create a part through the service layer
    pub async fn create_part(
        &self,
        name: &str,
        quantity: i32,
        min_quantity: i32,
    ) -> stockroom_api::services::parts::PartView {
        self.state
            .services
            .parts
            .create(stockroom_api::services::parts::CreatePartInput {
                name: name.to_string(),
                description: None,
                quantity,
                min_quantity,
                location: None,
                category: None,
                supplier_id: None,
            })
            .await
            .expect("create part")
    }
}

/// Decode a response body into JSON, asserting the expected status first.
pub async fn json_body(response: Response<Body>, expected: StatusCode) -> Value {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap_or_else(|_| json!({}));
    assert_eq!(status, expected, "unexpected status; body: {}", body);
    body
}
