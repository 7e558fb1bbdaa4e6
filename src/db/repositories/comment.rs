//! Comment repository
//!
//! Database operations for comments on news items.
//!
//! This module provides:
//! - `CommentRepository` trait defining the interface for comment data access
//! - `SqlxCommentRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Comment, CommentInput, CommentWithAuthor};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a new comment
    async fn create(&self, input: &CommentInput) -> Result<Comment>;

    /// Get a comment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// List comments for a news item, oldest first, joined with author
    /// usernames
    async fn list_for_news(&self, news_id: i64) -> Result<Vec<CommentWithAuthor>>;

    /// Update a comment's text
    async fn update_text(&self, id: i64, text: &str) -> Result<()>;

    /// Delete a comment
    async fn delete(&self, id: i64) -> Result<()>;

    /// Count total comments
    async fn count(&self) -> Result<i64>;

    /// Override a comment's creation timestamp.
    ///
    /// Ordering tests need deterministic timestamps; there is no reason to
    /// call this from request handling.
    async fn set_created(&self, id: i64, created: DateTime<Utc>) -> Result<()>;
}

/// SQLx-based comment repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    /// Create a new SQLx comment repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, input: &CommentInput) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_comment_sqlite(self.pool.as_sqlite().unwrap(), input).await
            }
            DatabaseDriver::Mysql => {
                create_comment_mysql(self.pool.as_mysql().unwrap(), input).await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_comment_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                get_comment_by_id_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn list_for_news(&self, news_id: i64) -> Result<Vec<CommentWithAuthor>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_comments_for_news_sqlite(self.pool.as_sqlite().unwrap(), news_id).await
            }
            DatabaseDriver::Mysql => {
                list_comments_for_news_mysql(self.pool.as_mysql().unwrap(), news_id).await
            }
        }
    }

    async fn update_text(&self, id: i64, text: &str) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_comment_text_sqlite(self.pool.as_sqlite().unwrap(), id, text).await
            }
            DatabaseDriver::Mysql => {
                update_comment_text_mysql(self.pool.as_mysql().unwrap(), id, text).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                delete_comment_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => delete_comment_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_comments_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => count_comments_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn set_created(&self, id: i64, created: DateTime<Utc>) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                set_comment_created_sqlite(self.pool.as_sqlite().unwrap(), id, created).await
            }
            DatabaseDriver::Mysql => {
                set_comment_created_mysql(self.pool.as_mysql().unwrap(), id, created).await
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_comment_sqlite(pool: &SqlitePool, input: &CommentInput) -> Result<Comment> {
    let created = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO comments (news_id, author_id, text, created)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(input.news_id)
    .bind(input.author_id)
    .bind(&input.text)
    .bind(created)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_rowid(),
        news_id: input.news_id,
        author_id: input.author_id,
        text: input.text.clone(),
        created,
    })
}

async fn get_comment_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Comment>> {
    let row = sqlx::query(
        "SELECT id, news_id, author_id, text, created FROM comments WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get comment by ID")?;

    match row {
        Some(row) => Ok(Some(Comment {
            id: row.get("id"),
            news_id: row.get("news_id"),
            author_id: row.get("author_id"),
            text: row.get("text"),
            created: row.get("created"),
        })),
        None => Ok(None),
    }
}

async fn list_comments_for_news_sqlite(
    pool: &SqlitePool,
    news_id: i64,
) -> Result<Vec<CommentWithAuthor>> {
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.news_id, c.author_id, u.username AS author_username,
               c.text, c.created
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.news_id = ?
        ORDER BY c.created ASC, c.id ASC
        "#,
    )
    .bind(news_id)
    .fetch_all(pool)
    .await
    .context("Failed to list comments for news")?;

    Ok(rows
        .iter()
        .map(|row| CommentWithAuthor {
            id: row.get("id"),
            news_id: row.get("news_id"),
            author_id: row.get("author_id"),
            author_username: row.get("author_username"),
            text: row.get("text"),
            created: row.get("created"),
        })
        .collect())
}

async fn update_comment_text_sqlite(pool: &SqlitePool, id: i64, text: &str) -> Result<()> {
    sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
        .bind(text)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update comment text")?;

    Ok(())
}

async fn delete_comment_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;

    Ok(())
}

async fn count_comments_sqlite(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM comments")
        .fetch_one(pool)
        .await
        .context("Failed to count comments")?;
    Ok(row.get("count"))
}

async fn set_comment_created_sqlite(
    pool: &SqlitePool,
    id: i64,
    created: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("UPDATE comments SET created = ? WHERE id = ?")
        .bind(created)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to set comment created timestamp")?;

    Ok(())
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_comment_mysql(pool: &MySqlPool, input: &CommentInput) -> Result<Comment> {
    let created = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO comments (news_id, author_id, text, created)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(input.news_id)
    .bind(input.author_id)
    .bind(&input.text)
    .bind(created)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_id() as i64,
        news_id: input.news_id,
        author_id: input.author_id,
        text: input.text.clone(),
        created,
    })
}

async fn get_comment_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Comment>> {
    let row = sqlx::query(
        "SELECT id, news_id, author_id, text, created FROM comments WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get comment by ID")?;

    match row {
        Some(row) => Ok(Some(Comment {
            id: row.get("id"),
            news_id: row.get("news_id"),
            author_id: row.get("author_id"),
            text: row.get("text"),
            created: row.get("created"),
        })),
        None => Ok(None),
    }
}

async fn list_comments_for_news_mysql(
    pool: &MySqlPool,
    news_id: i64,
) -> Result<Vec<CommentWithAuthor>> {
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.news_id, c.author_id, u.username AS author_username,
               c.text, c.created
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.news_id = ?
        ORDER BY c.created ASC, c.id ASC
        "#,
    )
    .bind(news_id)
    .fetch_all(pool)
    .await
    .context("Failed to list comments for news")?;

    Ok(rows
        .iter()
        .map(|row| CommentWithAuthor {
            id: row.get("id"),
            news_id: row.get("news_id"),
            author_id: row.get("author_id"),
            author_username: row.get("author_username"),
            text: row.get("text"),
            created: row.get("created"),
        })
        .collect())
}

async fn update_comment_text_mysql(pool: &MySqlPool, id: i64, text: &str) -> Result<()> {
    sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
        .bind(text)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update comment text")?;

    Ok(())
}

async fn delete_comment_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;

    Ok(())
}

async fn count_comments_mysql(pool: &MySqlPool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM comments")
        .fetch_one(pool)
        .await
        .context("Failed to count comments")?;
    Ok(row.get("count"))
}

async fn set_comment_created_mysql(
    pool: &MySqlPool,
    id: i64,
    created: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("UPDATE comments SET created = ? WHERE id = ?")
        .bind(created)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to set comment created timestamp")?;

    Ok(())
}
