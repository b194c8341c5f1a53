//! Storage layer for the HAPI indexer.
//!
//! This module provides database operations for:
//! - Networks (stake and reward configuration)
//! - Reporters and cases
//! - Reported addresses and assets (risk lookups)
//! - Reporter reward counters

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

pub mod case;
pub mod network;
pub mod report;
pub mod reporter;
pub mod reward;
pub mod types;

pub use types::*;

/// Database storage for the indexer.
///
/// Provides async access to SQLite database with connection pooling.
#[derive(Debug, Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Create a new storage instance with the given database URL.
    ///
    /// The database file is created if it doesn't exist. Pool sizes default to
    /// 5 and 1 connections.
    ///
    /// # Example
    /// ```no_run
    /// # use hapi_indexer::storage::Storage;
    /// # async fn example() -> anyhow::Result<()> {
    /// let storage = Storage::new("sqlite://hapi.db", None, None).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(
        database_url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self> {
        info!("Connecting to database: {}", database_url);

        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {}", database_url))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.unwrap_or(5))
            .min_connections(min_connections.unwrap_or(1))
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        info!("Database connection established");

        Ok(Self { pool })
    }

    /// Create a new storage instance with a specific file path.
    pub async fn new_with_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let database_url = format!("sqlite://{}", path.display());
        Self::new(&database_url, None, None).await
    }

    /// Run database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations");

        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run migrations")?;

        info!("Migrations completed successfully");

        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        info!("Closing database connection");
        self.pool.close().await;
    }

    /// Get database statistics.
    pub async fn stats(&self) -> Result<DatabaseStats> {
        Ok(DatabaseStats {
            network_count: self.count_rows("networks").await?,
            reporter_count: self.count_rows("reporters").await?,
            case_count: self.count_rows("cases").await?,
            address_count: self.count_rows("addresses").await?,
            asset_count: self.count_rows("assets").await?,
        })
    }

    async fn count_rows(&self, table: &'static str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let count: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to count {}", table))?;

        Ok(count as u64)
    }

    /// Check database health.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database health check failed")?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    /// Fresh migrated database; keep the temp file alive for the test's duration.
    pub(crate) async fn storage() -> (Storage, NamedTempFile) {
        let temp_db = NamedTempFile::new().unwrap();
        let storage = Storage::new_with_path(temp_db.path()).await.unwrap();
        storage.run_migrations().await.unwrap();
        (storage, temp_db)
    }

    #[tokio::test]
    async fn test_storage_creation() {
        let (storage, _temp_db) = storage().await;

        storage.health_check().await.unwrap();

        storage.close().await;
    }

    #[tokio::test]
    async fn test_database_stats() {
        let (storage, _temp_db) = storage().await;

        let stats = storage.stats().await.unwrap();
        assert_eq!(stats, DatabaseStats::default());

        storage.close().await;
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let (storage, _temp_db) = storage().await;

        storage.run_migrations().await.unwrap();
        storage.health_check().await.unwrap();

        storage.close().await;
    }
}
