//! News repository
//!
//! Database operations for news items.
//!
//! This module provides:
//! - `NewsRepository` trait defining the interface for news data access
//! - `SqlxNewsRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{News, NewsInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// News repository trait
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Create a news item
    async fn create(&self, input: &NewsInput) -> Result<News>;

    /// Get a news item by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<News>>;

    /// List the latest news items, newest date first (ties broken by
    /// newest id), capped at `limit`
    async fn list_latest(&self, limit: i64) -> Result<Vec<News>>;

    /// Count total news items
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based news repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxNewsRepository {
    pool: DynDatabasePool,
}

impl SqlxNewsRepository {
    /// Create a new SQLx news repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NewsRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NewsRepository for SqlxNewsRepository {
    async fn create(&self, input: &NewsInput) -> Result<News> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_news_sqlite(self.pool.as_sqlite().unwrap(), input).await,
            DatabaseDriver::Mysql => create_news_mysql(self.pool.as_mysql().unwrap(), input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<News>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_news_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_news_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list_latest(&self, limit: i64) -> Result<Vec<News>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_latest_news_sqlite(self.pool.as_sqlite().unwrap(), limit).await
            }
            DatabaseDriver::Mysql => {
                list_latest_news_mysql(self.pool.as_mysql().unwrap(), limit).await
            }
        }
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_news_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => count_news_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_news_sqlite(pool: &SqlitePool, input: &NewsInput) -> Result<News> {
    let result = sqlx::query("INSERT INTO news (title, text, date) VALUES (?, ?, ?)")
        .bind(&input.title)
        .bind(&input.text)
        .bind(input.date)
        .execute(pool)
        .await
        .context("Failed to create news item")?;

    Ok(News {
        id: result.last_insert_rowid(),
        title: input.title.clone(),
        text: input.text.clone(),
        date: input.date,
    })
}

async fn get_news_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<News>> {
    let row = sqlx::query("SELECT id, title, text, date FROM news WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get news by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_news_sqlite(&row))),
        None => Ok(None),
    }
}

async fn list_latest_news_sqlite(pool: &SqlitePool, limit: i64) -> Result<Vec<News>> {
    let rows = sqlx::query(
        "SELECT id, title, text, date FROM news ORDER BY date DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("Failed to list latest news")?;

    Ok(rows.iter().map(row_to_news_sqlite).collect())
}

async fn count_news_sqlite(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM news")
        .fetch_one(pool)
        .await
        .context("Failed to count news")?;
    Ok(row.get("count"))
}

fn row_to_news_sqlite(row: &sqlx::sqlite::SqliteRow) -> News {
    News {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        date: row.get("date"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_news_mysql(pool: &MySqlPool, input: &NewsInput) -> Result<News> {
    let result = sqlx::query("INSERT INTO news (title, text, date) VALUES (?, ?, ?)")
        .bind(&input.title)
        .bind(&input.text)
        .bind(input.date)
        .execute(pool)
        .await
        .context("Failed to create news item")?;

    Ok(News {
        id: result.last_insert_id() as i64,
        title: input.title.clone(),
        text: input.text.clone(),
        date: input.date,
    })
}

async fn get_news_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<News>> {
    let row = sqlx::query("SELECT id, title, text, date FROM news WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get news by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_news_mysql(&row))),
        None => Ok(None),
    }
}

async fn list_latest_news_mysql(pool: &MySqlPool, limit: i64) -> Result<Vec<News>> {
    let rows = sqlx::query(
        "SELECT id, title, text, date FROM news ORDER BY date DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("Failed to list latest news")?;

    Ok(rows.iter().map(row_to_news_mysql).collect())
}

async fn count_news_mysql(pool: &MySqlPool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM news")
        .fetch_one(pool)
        .await
        .context("Failed to count news")?;
    Ok(row.get("count"))
}

fn row_to_news_mysql(row: &sqlx::mysql::MySqlRow) -> News {
    News {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        date: row.get("date"),
    }
}
