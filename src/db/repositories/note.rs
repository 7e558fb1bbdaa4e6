//! Note repository
//!
//! Database operations for personal notes.
//!
//! This module provides:
//! - `NoteRepository` trait defining the interface for note data access
//! - `SqlxNoteRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Note;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Note repository trait
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Create a new note
    async fn create(&self, note: &Note) -> Result<Note>;

    /// Get a note by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Note>>;

    /// Check whether a slug is already taken
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;

    /// List all notes owned by a user, oldest first
    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Note>>;

    /// Update a note's title, text and slug
    async fn update(&self, note: &Note) -> Result<()>;

    /// Delete a note
    async fn delete(&self, id: i64) -> Result<()>;

    /// Count total notes
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based note repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxNoteRepository {
    pool: DynDatabasePool,
}

impl SqlxNoteRepository {
    /// Create a new SQLx note repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NoteRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NoteRepository for SqlxNoteRepository {
    async fn create(&self, note: &Note) -> Result<Note> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_note_sqlite(self.pool.as_sqlite().unwrap(), note).await,
            DatabaseDriver::Mysql => create_note_mysql(self.pool.as_mysql().unwrap(), note).await,
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Note>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_note_by_slug_sqlite(self.pool.as_sqlite().unwrap(), slug).await
            }
            DatabaseDriver::Mysql => {
                get_note_by_slug_mysql(self.pool.as_mysql().unwrap(), slug).await
            }
        }
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        Ok(self.get_by_slug(slug).await?.is_some())
    }

    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Note>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_notes_by_author_sqlite(self.pool.as_sqlite().unwrap(), author_id).await
            }
            DatabaseDriver::Mysql => {
                list_notes_by_author_mysql(self.pool.as_mysql().unwrap(), author_id).await
            }
        }
    }

    async fn update(&self, note: &Note) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_note_sqlite(self.pool.as_sqlite().unwrap(), note).await,
            DatabaseDriver::Mysql => update_note_mysql(self.pool.as_mysql().unwrap(), note).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_note_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_note_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_notes_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => count_notes_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_note_sqlite(pool: &SqlitePool, note: &Note) -> Result<Note> {
    let result = sqlx::query(
        r#"
        INSERT INTO notes (title, text, slug, author_id)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&note.title)
    .bind(&note.text)
    .bind(&note.slug)
    .bind(note.author_id)
    .execute(pool)
    .await
    .context("Failed to create note")?;

    let mut created = note.clone();
    created.id = result.last_insert_rowid();
    Ok(created)
}

async fn get_note_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Note>> {
    let row = sqlx::query(
        "SELECT id, title, text, slug, author_id FROM notes WHERE slug = ?",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get note by slug")?;

    match row {
        Some(row) => Ok(Some(row_to_note_sqlite(&row))),
        None => Ok(None),
    }
}

async fn list_notes_by_author_sqlite(pool: &SqlitePool, author_id: i64) -> Result<Vec<Note>> {
    let rows = sqlx::query(
        "SELECT id, title, text, slug, author_id FROM notes WHERE author_id = ? ORDER BY id ASC",
    )
    .bind(author_id)
    .fetch_all(pool)
    .await
    .context("Failed to list notes by author")?;

    Ok(rows.iter().map(row_to_note_sqlite).collect())
}

async fn update_note_sqlite(pool: &SqlitePool, note: &Note) -> Result<()> {
    sqlx::query("UPDATE notes SET title = ?, text = ?, slug = ? WHERE id = ?")
        .bind(&note.title)
        .bind(&note.text)
        .bind(&note.slug)
        .bind(note.id)
        .execute(pool)
        .await
        .context("Failed to update note")?;

    Ok(())
}

async fn delete_note_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM notes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete note")?;

    Ok(())
}

async fn count_notes_sqlite(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM notes")
        .fetch_one(pool)
        .await
        .context("Failed to count notes")?;
    Ok(row.get("count"))
}

fn row_to_note_sqlite(row: &sqlx::sqlite::SqliteRow) -> Note {
    Note {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        slug: row.get("slug"),
        author_id: row.get("author_id"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_note_mysql(pool: &MySqlPool, note: &Note) -> Result<Note> {
    let result = sqlx::query(
        r#"
        INSERT INTO notes (title, text, slug, author_id)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&note.title)
    .bind(&note.text)
    .bind(&note.slug)
    .bind(note.author_id)
    .execute(pool)
    .await
    .context("Failed to create note")?;

    let mut created = note.clone();
    created.id = result.last_insert_id() as i64;
    Ok(created)
}

async fn get_note_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<Note>> {
    let row = sqlx::query(
        "SELECT id, title, text, slug, author_id FROM notes WHERE slug = ?",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get note by slug")?;

    match row {
        Some(row) => Ok(Some(row_to_note_mysql(&row))),
        None => Ok(None),
    }
}

async fn list_notes_by_author_mysql(pool: &MySqlPool, author_id: i64) -> Result<Vec<Note>> {
    let rows = sqlx::query(
        "SELECT id, title, text, slug, author_id FROM notes WHERE author_id = ? ORDER BY id ASC",
    )
    .bind(author_id)
    .fetch_all(pool)
    .await
    .context("Failed to list notes by author")?;

    Ok(rows.iter().map(row_to_note_mysql).collect())
}

async fn update_note_mysql(pool: &MySqlPool, note: &Note) -> Result<()> {
    sqlx::query("UPDATE notes SET title = ?, text = ?, slug = ? WHERE id = ?")
        .bind(&note.title)
        .bind(&note.text)
        .bind(&note.slug)
        .bind(note.id)
        .execute(pool)
        .await
        .context("Failed to update note")?;

    Ok(())
}

async fn delete_note_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM notes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete note")?;

    Ok(())
}

async fn count_notes_mysql(pool: &MySqlPool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM notes")
        .fetch_one(pool)
        .await
        .context("Failed to count notes")?;
    Ok(row.get("count"))
}

fn row_to_note_mysql(row: &sqlx::mysql::MySqlRow) -> Note {
    Note {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        slug: row.get("slug"),
        author_id: row.get("author_id"),
    }
}
