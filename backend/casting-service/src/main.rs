use actix_web::{App, HttpServer};
use anyhow::Context;
use casting_service::config::StorageBackend;
use casting_service::{routes, telemetry, Config, Repositories};
use db_pool::{create_migrated_pool, DbConfig};
use jwks_auth::{AuthConfig, TokenVerifier};
use std::sync::Arc;
use sqlx::migrate::Migrator;
use tracing_actix_web::TracingLogger;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let config = Config::from_env()
        .map_err(anyhow::Error::msg)
        .context("Failed to load configuration")?;
    let auth_config = AuthConfig::from_env()
        .map_err(anyhow::Error::msg)
        .context("Failed to load identity provider configuration")?;

    tracing::info!("Starting casting-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        env = %config.app.env,
        issuer = %auth_config.issuer,
        audience = %auth_config.audience,
        storage = ?config.storage,
        "Configuration loaded"
    );

    let repos = match config.storage {
        StorageBackend::Postgres => {
            let db_cfg = DbConfig::from_env("casting-service").map_err(anyhow::Error::msg)?;
            db_cfg.log_config();
            let pool = create_migrated_pool(&db_cfg, &MIGRATOR)
                .await
                .context("Failed to prepare database")?;

            Repositories::postgres(pool)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Repositories::memory()
        }
    };

    let verifier = Arc::new(TokenVerifier::from_config(&auth_config));
    let cors_config = config.cors.clone();
    let bind_address = config.bind_address();
    tracing::info!("Starting HTTP server at {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(routes::cors(&cors_config))
            .wrap(TracingLogger::default())
            .configure(|cfg| routes::configure(cfg, &repos, verifier.clone()))
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await?;

    tracing::info!("casting-service shutting down");
    Ok(())
}
