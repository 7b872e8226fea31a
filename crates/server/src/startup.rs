use std::{sync::Arc, time::Duration};

use axum::Router;
use configs::AppConfig;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};
use service::auth::{repo::seaorm::SeaOrmAuthRepository, service::AuthConfig, AuthService};
use service::product::{repo::seaorm::SeaOrmProductRepository, ProductService};
use service::storage::SupabaseStorage;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire repositories, storage and services from configuration.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<ServerState> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.synchronize {
        models::db::migrate(&db).await?;
    } else {
        info!(event = "migrations_skipped", "database.synchronize is off");
    }

    let auth = AuthService::new(
        Arc::new(SeaOrmAuthRepository { db: db.clone() }),
        AuthConfig { jwt_secret: cfg.auth.jwt_secret.clone(), token_ttl_secs: cfg.auth.token_ttl_secs },
    );

    let storage = SupabaseStorage::new(
        &cfg.storage.url,
        &cfg.storage.key,
        &cfg.storage.bucket,
        Duration::from_secs(cfg.storage.timeout_secs),
    )?;
    let products = ProductService::new(Arc::new(SeaOrmProductRepository::new(db)), Arc::new(storage));

    Ok(ServerState { auth: Arc::new(auth), products: Arc::new(products) })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
    info!(event = "shutdown", "shutdown signal received");
}

/// Public entry: load config, build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    common::utils::logging::init_logging_from_env();

    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let state = build_state(&cfg).await?;

    let app: Router = routes::build_router(state, build_cors(), cfg.server.max_upload_bytes);

    let addr = cfg.server.bind_addr();
    info!(service = "catalog", event = "listening", %addr, bucket = %cfg.storage.bucket, "starting http server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
