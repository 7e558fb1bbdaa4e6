//! Connection pooling for the two supported database backends.
//!
//! Repositories never hold a concrete pool. They receive a
//! [`DynDatabasePool`] and dispatch on [`DatabasePool::driver`] to reach the
//! underlying SQLite or MySQL pool for their queries.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    mysql::{MySqlPool, MySqlPoolOptions},
    sqlite::{SqlitePool, SqlitePoolOptions},
};
use std::sync::Arc;

use crate::config::{DatabaseConfig, DatabaseDriver};

const SQLITE_MAX_CONNECTIONS: u32 = 20;
const MYSQL_MAX_CONNECTIONS: u32 = 30;

/// Backend-agnostic handle to a connection pool.
#[async_trait]
pub trait DatabasePool: Send + Sync {
    /// Run a statement that returns no rows, yielding the affected count
    async fn execute(&self, query: &str) -> Result<u64>;

    /// Verify the pool can still reach the database
    async fn ping(&self) -> Result<()>;

    /// Shut the pool down
    async fn close(&self);

    /// Which backend this pool talks to
    fn driver(&self) -> DatabaseDriver;

    /// The concrete SQLite pool, when this is a SQLite backend
    fn as_sqlite(&self) -> Option<&SqlitePool>;

    /// The concrete MySQL pool, when this is a MySQL backend
    fn as_mysql(&self) -> Option<&MySqlPool>;
}

/// Shared, dynamically dispatched pool handle
pub type DynDatabasePool = Arc<dyn DatabasePool>;

/// Open a pool for whichever backend the configuration selects.
pub async fn create_pool(config: &DatabaseConfig) -> Result<DynDatabasePool> {
    match config.driver {
        DatabaseDriver::Sqlite => Ok(Arc::new(SqliteDatabase::new(&config.url).await?)),
        DatabaseDriver::Mysql => Ok(Arc::new(MysqlDatabase::new(&config.url).await?)),
    }
}

/// An in-memory SQLite pool, for tests
pub async fn create_test_pool() -> Result<DynDatabasePool> {
    let config = DatabaseConfig {
        driver: DatabaseDriver::Sqlite,
        url: ":memory:".to_string(),
    };
    create_pool(&config).await
}

/// SQLite-backed pool
pub struct SqliteDatabase {
    pool: SqlitePool,
}

fn sqlite_is_memory(url: &str) -> bool {
    url == ":memory:" || url == "sqlite::memory:"
}

/// Normalize a configured SQLite url into something sqlx accepts, adding
/// create mode for file databases that may not exist yet.
fn sqlite_connect_url(url: &str) -> String {
    if sqlite_is_memory(url) {
        return "sqlite::memory:".to_string();
    }
    let with_scheme = if url.starts_with("sqlite:") {
        url.to_string()
    } else {
        format!("sqlite:{}", url)
    };
    if with_scheme.contains('?') {
        with_scheme
    } else {
        format!("{}?mode=rwc", with_scheme)
    }
}

/// Create missing parent directories for a file-backed database.
fn sqlite_prepare_path(url: &str) -> Result<()> {
    let path = url.trim_start_matches("sqlite:");
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }
    }
    Ok(())
}

impl SqliteDatabase {
    pub async fn new(url: &str) -> Result<Self> {
        let in_memory = sqlite_is_memory(url);
        if !in_memory {
            sqlite_prepare_path(url)?;
        }

        // Every connection to an in-memory database sees its own empty
        // database, so that pool is capped at a single connection.
        let max_connections = if in_memory { 1 } else { SQLITE_MAX_CONNECTIONS };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&sqlite_connect_url(url))
            .await
            .with_context(|| format!("Failed to connect to SQLite database: {}", url))?;

        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .context("Failed to enable foreign keys")?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabasePool for SqliteDatabase {
    async fn execute(&self, query: &str) -> Result<u64> {
        let done = sqlx::query(query)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to execute query: {}", query))?;
        Ok(done.rows_affected())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database ping failed")?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    fn driver(&self) -> DatabaseDriver {
        DatabaseDriver::Sqlite
    }

    fn as_sqlite(&self) -> Option<&SqlitePool> {
        Some(&self.pool)
    }

    fn as_mysql(&self) -> Option<&MySqlPool> {
        None
    }
}

/// MySQL-backed pool
pub struct MysqlDatabase {
    pool: MySqlPool,
}

impl MysqlDatabase {
    pub async fn new(url: &str) -> Result<Self> {
        let connect_url = if url.starts_with("mysql://") {
            url.to_string()
        } else {
            format!("mysql://{}", url)
        };

        let pool = MySqlPoolOptions::new()
            .max_connections(MYSQL_MAX_CONNECTIONS)
            .connect(&connect_url)
            .await
            .with_context(|| format!("Failed to connect to MySQL database: {}", url))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabasePool for MysqlDatabase {
    async fn execute(&self, query: &str) -> Result<u64> {
        let done = sqlx::query(query)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to execute query: {}", query))?;
        Ok(done.rows_affected())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database ping failed")?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    fn driver(&self) -> DatabaseDriver {
        DatabaseDriver::Mysql
    }

    fn as_sqlite(&self) -> Option<&SqlitePool> {
        None
    }

    fn as_mysql(&self) -> Option<&MySqlPool> {
        Some(&self.pool)
    }
}
