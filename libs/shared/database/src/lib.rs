use anyhow::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};
use thiserror::Error;
use tracing::{debug, info};

use shared_config::AppConfig;

/// Storage failure as seen by cell services. Carries the driver message for
/// server-side logs; callers map it to a generic response.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct StoreError(pub String);

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError(err.to_string())
    }
}

const SCHEMA: &str = include_str!("../schema.sql");

/// Shared connection pool. Cells borrow the pool; transactions are always
/// scoped to a single pooled connection via `pool.begin()`.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        debug!("Connecting to database");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create tables when they do not exist yet. Idempotent.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        info!("Database schema is in place");
        Ok(())
    }
}
