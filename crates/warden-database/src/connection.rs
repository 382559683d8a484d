//! Storage selection and PostgreSQL connection pool management.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use warden_core::config::DatabaseConfig;
use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;

use crate::migration::run_migrations;
use crate::repositories::Repositories;

/// Opens the store named by `database.url`.
///
/// `memory` selects the in-process repositories and yields no pool. Any
/// other URL is connected to and migrated before the repositories are
/// handed out; the pool is returned so the caller can close it.
pub async fn open_repositories(
    config: &DatabaseConfig,
) -> AppResult<(Repositories, Option<DatabasePool>)> {
    if config.is_memory() {
        warn!("Using the in-memory store; nothing survives a restart");
        return Ok((Repositories::memory(), None));
    }

    let db_pool = DatabasePool::connect(config).await?;
    run_migrations(db_pool.pool()).await?;

    Ok((Repositories::postgres(db_pool.pool().clone()), Some(db_pool)))
}

/// Wrapper around the sqlx PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Create a new database pool from configuration.
    ///
    /// The `memory` URL is refused here; use [`open_repositories`].
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        if config.is_memory() {
            return Err(AppError::configuration(
                "database.url = \"memory\" has no PostgreSQL pool",
            ));
        }

        info!(
            url = %mask_password(&config.url),
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to connect to database: {e}"),
                    e,
                )
            })?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Return a reference to the underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

/// Mask the password portion of a database URL for safe logging.
fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            if colon_pos > scheme_end {
                return format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..]);
            }
        }
    }
    url.to_string()
}
