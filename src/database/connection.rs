//! Database connection management

use sqlx::{Pool, Postgres};
use std::sync::Arc;
use std::time::Duration;

use super::memory::MemoryStore;
use super::postgres::PostgresStore;
use super::store::DocumentStore;
use crate::config::{DatabaseConfig, StoreBackend};
use crate::utils::errors::EventHubError;

pub type DatabasePool = Pool<Postgres>;

/// Pool tuning that is not exposed through the settings file
#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            max_lifetime: Some(Duration::from_secs(1800)),
        }
    }
}

/// Create a new database connection pool
pub async fn create_pool(config: &DatabaseConfig, options: &PoolOptions) -> Result<DatabasePool, EventHubError> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(options.acquire_timeout)
        .idle_timeout(options.idle_timeout)
        .max_lifetime(options.max_lifetime)
        .connect(&config.url)
        .await?;

    // Test the connection
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await?;

    tracing::info!("Database connection pool created successfully");
    Ok(pool)
}

/// Run database migrations
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), EventHubError> {
    tracing::info!("Running database migrations...");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}

/// Check database health
pub async fn health_check(pool: &DatabasePool) -> Result<(), EventHubError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await?;

    Ok(())
}

/// Build the document store selected by `database.backend`, migrating
/// Postgres before handing it out
pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>, EventHubError> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory document store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = create_pool(config, &PoolOptions::default()).await?;
            run_migrations(&pool).await?;
            Ok(Arc::new(PostgresStore::new(pool)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_options_default() {
        let options = PoolOptions::default();
        assert_eq!(options.acquire_timeout, Duration::from_secs(30));
        assert_eq!(options.max_lifetime, Some(Duration::from_secs(1800)));
    }

    #[tokio::test]
    async fn test_open_memory_store() {
        let config = crate::config::Settings::default().database;
        let store = open_store(&config).await.unwrap();
        assert!(store.ping().await.is_ok());
    }
}
