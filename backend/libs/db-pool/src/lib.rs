//! Database connection pool management
//!
//! Pool creation and configuration shared by services backed by PostgreSQL

pub mod env_utils;

use env_utils::parse_env_with_default;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

/// Database connection pool configuration
#[derive(Clone)]
pub struct DbConfig {
    /// Service name used in log fields
    pub service_name: String,
    /// PostgreSQL connection URL
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Timeout for the startup verification query
    pub connect_timeout_secs: u64,
    /// Timeout for acquiring a connection from the pool
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("service_name", &self.service_name)
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("max_lifetime_secs", &self.max_lifetime_secs)
            .finish()
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            service_name: String::from("unknown"),
            database_url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 5,
            acquire_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }
}

impl DbConfig {
    /// Create a new DbConfig from environment variables
    pub fn from_env(service_name: &str) -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable not set".to_string())?;
        let defaults = Self::default();

        let config = Self {
            service_name: service_name.to_string(),
            database_url,
            max_connections: parse_env_with_default("DB_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: parse_env_with_default("DB_MIN_CONNECTIONS", defaults.min_connections),
            connect_timeout_secs: parse_env_with_default(
                "DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            ),
            acquire_timeout_secs: parse_env_with_default(
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout_secs,
            ),
            idle_timeout_secs: parse_env_with_default(
                "DB_IDLE_TIMEOUT_SECS",
                defaults.idle_timeout_secs,
            ),
            max_lifetime_secs: parse_env_with_default(
                "DB_MAX_LIFETIME_SECS",
                defaults.max_lifetime_secs,
            ),
        };

        if config.min_connections > config.max_connections {
            return Err(format!(
                "DB_MIN_CONNECTIONS ({}) exceeds DB_MAX_CONNECTIONS ({})",
                config.min_connections, config.max_connections
            ));
        }

        Ok(config)
    }

    /// Log pool configuration details
    pub fn log_config(&self) {
        info!(
            service = %self.service_name,
            max_connections = self.max_connections,
            min_connections = self.min_connections,
            acquire_timeout_secs = self.acquire_timeout_secs,
            idle_timeout_secs = self.idle_timeout_secs,
            max_lifetime_secs = self.max_lifetime_secs,
            "Database pool configuration"
        );
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(self.max_lifetime_secs))
            .test_before_acquire(true)
    }
}

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("database verification query failed: {0}")]
    Verify(#[source] sqlx::Error),

    #[error("database verification timed out after {0}s")]
    VerifyTimeout(u64),

    #[error("database migration failed: {0}")]
    Migrate(#[from] MigrateError),
}

/// Open the pool and check it answers within `connect_timeout_secs`
pub async fn create_pool(config: &DbConfig) -> Result<PgPool, PoolError> {
    let pool = config
        .pool_options()
        .connect(&config.database_url)
        .await
        .map_err(PoolError::Connect)?;

    let timeout = Duration::from_secs(config.connect_timeout_secs);
    match tokio::time::timeout(timeout, sqlx::query("SELECT 1").execute(&pool)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => return Err(PoolError::Verify(e)),
        Err(_) => return Err(PoolError::VerifyTimeout(config.connect_timeout_secs)),
    }

    info!(service = %config.service_name, "Database pool ready");
    Ok(pool)
}

/// Open the pool and bring the schema up to date
///
/// `migrator` comes from `sqlx::migrate!` in the owning service, since the
/// macro resolves paths relative to the crate that invokes it.
pub async fn create_migrated_pool(
    config: &DbConfig,
    migrator: &Migrator,
) -> Result<PgPool, PoolError> {
    let pool = create_pool(config).await?;
    if let Err(e) = migrator.run(&pool).await {
        error!(service = %config.service_name, error = %e, "Database migration failed");
        return Err(e.into());
    }

    info!(
        service = %config.service_name,
        migrations = migrator.iter().count(),
        "Database schema up to date"
    );
    Ok(pool)
}
