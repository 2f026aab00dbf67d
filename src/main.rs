use std::{net::SocketAddr, sync::Arc, time::Duration};

use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use tokio::signal;
use tracing::{error, info, warn};

use stockroom_api as api;

use api::entities::user::{self, Entity as User, UserRole};
use api::services::notifications::{LowStockNotifier, NoopNotifier, WebhookNotifier};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    // Init DB
    let db_pool = api::db::establish_connection_from_app_config(&cfg).await?;
    if cfg.auto_migrate {
        api::db::run_migrations(&db_pool).await.map_err(|e| {
            error!("Failed running migrations: {}", e);
            e
        })?;
    }
    let db_arc = Arc::new(db_pool);

    seed_default_admin(&db_arc, cfg.is_production()).await?;

    // Outbound low-stock notifier; falls back to a no-op when unconfigured
    let notifier: Arc<dyn LowStockNotifier> = match (&cfg.low_stock_webhook_url, cfg.low_stock_alerts_enabled) {
        (Some(endpoint), true) => {
            info!("Low-stock notifications enabled: {}", endpoint);
            Arc::new(WebhookNotifier::new(
                endpoint.clone(),
                Duration::from_secs(cfg.notify_timeout_secs),
            ))
        }
        _ => {
            info!("Low-stock notifications disabled");
            Arc::new(NoopNotifier)
        }
    };

    // Auth service for token issuance and the auth middleware
    let auth_cfg = api::auth::AuthConfig::new(
        cfg.jwt_secret.clone(),
        Duration::from_secs(cfg.jwt_expiration as u64),
    );
    let auth_service = Arc::new(api::auth::AuthService::new(auth_cfg, db_arc.clone()));

    let services = api::services::AppServices::new(db_arc.clone(), notifier);

    let app_state = api::AppState {
        db: db_arc,
        config: cfg.clone(),
        services,
        auth: auth_service,
    };

    let app = api::app_router(app_state);

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port).parse()?;
    info!("stockroom-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Create the default admin account on an empty user table so a fresh
/// deployment is reachable. The placeholder credentials must be rotated
/// immediately; refuse to plant them in production.
async fn seed_default_admin(
    db: &Arc<sea_orm::DatabaseConnection>,
    is_production: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let user_count = User::find().count(db.as_ref()).await?;
    if user_count > 0 {
        return Ok(());
    }
    if is_production {
        warn!("user table is empty; create an admin account via the API");
        return Ok(());
    }

    let admin = user::ActiveModel {
        username: Set("admin".to_string()),
        password_hash: Set(api::auth::hash_password("admin123")?),
        role: Set(UserRole::Admin.as_str().to_string()),
        ..Default::default()
    };
    admin.insert(db.as_ref()).await?;
    warn!("default admin user created (username: admin) - change its password now");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
