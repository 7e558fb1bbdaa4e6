//! Comment service
//!
//! Business logic for comments: bad-word validation on create and edit, and
//! author-gated mutation. A caller who is not the comment's author gets
//! `NotFound`, never a "forbidden" answer, so probing for other people's
//! comment ids reveals nothing.

use crate::db::repositories::{CommentRepository, NewsRepository};
use crate::models::{Comment, CommentInput};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Words that may not appear in comment text
pub const BAD_WORDS: &[&str] = &["scoundrel", "rascal"];

/// Form error shown when a comment contains a bad word
pub const BAD_WORDS_WARNING: &str = "Watch your language!";

/// Error types for comment service operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Comment text contains a disallowed word
    #[error("{}", BAD_WORDS_WARNING)]
    ProhibitedWords,

    /// Comment text is empty
    #[error("Comment text cannot be empty")]
    EmptyText,

    /// The comment or its news item does not exist, or the caller may not
    /// see it
    #[error("Not found")]
    NotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Comment service
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
    news_repo: Arc<dyn NewsRepository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>, news_repo: Arc<dyn NewsRepository>) -> Self {
        Self { repo, news_repo }
    }

    /// Create a comment on a news item.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the news item does not exist
    /// - `EmptyText` when the text is blank
    /// - `ProhibitedWords` when the text contains a bad word; nothing is
    ///   written in that case
    pub async fn create(
        &self,
        news_id: i64,
        author_id: i64,
        text: &str,
    ) -> Result<Comment, CommentServiceError> {
        validate_text(text)?;

        self.news_repo
            .get_by_id(news_id)
            .await
            .context("Failed to get news item")?
            .ok_or(CommentServiceError::NotFound)?;

        let comment = self
            .repo
            .create(&CommentInput {
                news_id,
                author_id,
                text: text.trim().to_string(),
            })
            .await
            .context("Failed to create comment")?;

        Ok(comment)
    }

    /// Fetch a comment for its author.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id is unknown or the caller is not the author.
    pub async fn get_for_author(
        &self,
        id: i64,
        author_id: i64,
    ) -> Result<Comment, CommentServiceError> {
        let comment = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get comment")?
            .ok_or(CommentServiceError::NotFound)?;

        // Existence masking: a foreign comment looks exactly like a missing one
        if comment.author_id != author_id {
            return Err(CommentServiceError::NotFound);
        }

        Ok(comment)
    }

    /// Edit a comment's text. Only the author may edit; the same validation
    /// as creation applies.
    pub async fn edit(
        &self,
        id: i64,
        author_id: i64,
        text: &str,
    ) -> Result<Comment, CommentServiceError> {
        let comment = self.get_for_author(id, author_id).await?;
        validate_text(text)?;

        self.repo
            .update_text(comment.id, text.trim())
            .await
            .context("Failed to update comment")?;

        Ok(Comment {
            text: text.trim().to_string(),
            ..comment
        })
    }

    /// Delete a comment. Only the author may delete.
    ///
    /// Returns the deleted comment (the caller needs its news id for the
    /// redirect back to the thread).
    pub async fn delete(&self, id: i64, author_id: i64) -> Result<Comment, CommentServiceError> {
        let comment = self.get_for_author(id, author_id).await?;

        self.repo
            .delete(comment.id)
            .await
            .context("Failed to delete comment")?;

        Ok(comment)
    }
}

/// Check comment text against the validation rules
fn validate_text(text: &str) -> Result<(), CommentServiceError> {
    if text.trim().is_empty() {
        return Err(CommentServiceError::EmptyText);
    }
    if contains_bad_words(text) {
        return Err(CommentServiceError::ProhibitedWords);
    }
    Ok(())
}

/// Case-insensitive substring check against [`BAD_WORDS`]
pub fn contains_bad_words(text: &str) -> bool {
    let lowered = text.to_lowercase();
    BAD_WORDS.iter().any(|word| lowered.contains(word))
}
