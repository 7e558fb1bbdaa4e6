//! Note service
//!
//! Business logic for personal notes: slug resolution, slug uniqueness and
//! owner-gated access. Every read and every mutation is scoped to the
//! requesting user; a note owned by someone else is indistinguishable from a
//! note that does not exist.

use crate::db::repositories::NoteRepository;
use crate::models::{Note, NoteInput};
use crate::services::slug::{slugify, MAX_SLUG_LEN};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Form error for an explicit slug that is already taken
pub fn duplicate_slug_warning(slug: &str) -> String {
    format!("{slug} - this slug already exists, please pick a unique value!")
}

/// Error types for note service operations
#[derive(Debug, thiserror::Error)]
pub enum NoteServiceError {
    /// The requested slug already belongs to another note
    #[error("{}", duplicate_slug_warning(.0))]
    DuplicateSlug(String),

    /// Title or text failed validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The note does not exist, or the caller may not see it
    #[error("Note not found")]
    NotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Note service
pub struct NoteService {
    repo: Arc<dyn NoteRepository>,
}

impl NoteService {
    pub fn new(repo: Arc<dyn NoteRepository>) -> Self {
        Self { repo }
    }

    /// Create a note for a user.
    ///
    /// An explicit slug must be free or the call fails with
    /// [`NoteServiceError::DuplicateSlug`]. A missing slug is derived from
    /// the title, with a numeric suffix appended until it is unique.
    pub async fn create(
        &self,
        author_id: i64,
        input: &NoteInput,
    ) -> Result<Note, NoteServiceError> {
        let (title, text) = validate_fields(&input.title, &input.text)?;
        let slug = self.resolve_slug(input.slug.as_deref(), &title, None).await?;

        let note = Note {
            id: 0,
            title,
            text,
            slug,
            author_id,
        };
        match self.repo.create(&note).await {
            Ok(created) => Ok(created),
            // A simultaneous submit can slip past the uniqueness check; the
            // UNIQUE index still rejects it, and that is a form error too
            Err(err) if is_unique_violation(&err) => {
                Err(NoteServiceError::DuplicateSlug(note.slug))
            }
            Err(err) => Err(err.context("Failed to create note").into()),
        }
    }

    /// Fetch a note for its owner.
    ///
    /// # Errors
    ///
    /// `NotFound` when the slug is unknown or the caller is not the owner.
    pub async fn get_for_owner(
        &self,
        slug: &str,
        author_id: i64,
    ) -> Result<Note, NoteServiceError> {
        let note = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get note")?
            .ok_or(NoteServiceError::NotFound)?;

        // Existence masking: a foreign note looks exactly like a missing one
        if note.author_id != author_id {
            return Err(NoteServiceError::NotFound);
        }

        Ok(note)
    }

    /// List all notes owned by a user, oldest first.
    pub async fn list(&self, author_id: i64) -> Result<Vec<Note>, NoteServiceError> {
        let notes = self
            .repo
            .list_by_author(author_id)
            .await
            .context("Failed to list notes")?;
        Ok(notes)
    }

    /// Update a note. Only the owner may update; an explicit new slug must
    /// not collide with any other note.
    pub async fn update(
        &self,
        slug: &str,
        author_id: i64,
        input: &NoteInput,
    ) -> Result<Note, NoteServiceError> {
        let note = self.get_for_owner(slug, author_id).await?;
        let (title, text) = validate_fields(&input.title, &input.text)?;
        let new_slug = self
            .resolve_slug(input.slug.as_deref(), &title, Some(&note))
            .await?;

        let updated = Note {
            title,
            text,
            slug: new_slug,
            ..note
        };
        match self.repo.update(&updated).await {
            Ok(()) => Ok(updated),
            Err(err) if is_unique_violation(&err) => {
                Err(NoteServiceError::DuplicateSlug(updated.slug))
            }
            Err(err) => Err(err.context("Failed to update note").into()),
        }
    }

    /// Delete a note. Only the owner may delete.
    pub async fn delete(&self, slug: &str, author_id: i64) -> Result<(), NoteServiceError> {
        let note = self.get_for_owner(slug, author_id).await?;
        self.repo
            .delete(note.id)
            .await
            .context("Failed to delete note")?;
        Ok(())
    }

    /// Resolve the slug for a create or update.
    ///
    /// `current` is the note being updated, so keeping its own slug is never
    /// a collision.
    async fn resolve_slug(
        &self,
        explicit: Option<&str>,
        title: &str,
        current: Option<&Note>,
    ) -> Result<String, NoteServiceError> {
        let explicit = explicit.map(str::trim).filter(|s| !s.is_empty());

        if let Some(slug) = explicit {
            if slug.len() > MAX_SLUG_LEN {
                return Err(NoteServiceError::ValidationError(format!(
                    "Slug must be at most {MAX_SLUG_LEN} characters"
                )));
            }
            if current.map(|n| n.slug.as_str()) != Some(slug)
                && self.slug_taken(slug).await?
            {
                return Err(NoteServiceError::DuplicateSlug(slug.to_string()));
            }
            return Ok(slug.to_string());
        }

        // Derived slugs never fail: walk -2, -3, ... until a free one shows up
        let base = slugify(title);
        if base.is_empty() {
            return Err(NoteServiceError::ValidationError(
                "Title must contain at least one usable character".to_string(),
            ));
        }

        // Keep the current slug stable across title-preserving edits
        if let Some(note) = current {
            if note.slug == base || note.slug.starts_with(&format!("{base}-")) {
                return Ok(note.slug.clone());
            }
        }
        if !self.slug_taken(&base).await? {
            return Ok(base);
        }

        let mut counter = 2;
        loop {
            let candidate = format!("{base}-{counter}");
            if !self.slug_taken(&candidate).await? {
                return Ok(candidate);
            }
            counter += 1;
        }
    }

    async fn slug_taken(&self, slug: &str) -> Result<bool, NoteServiceError> {
        let taken = self
            .repo
            .exists_by_slug(slug)
            .await
            .context("Failed to check slug")?;
        Ok(taken)
    }
}

/// Whether a repository error is the database rejecting a duplicate slug
fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(sqlx::Error::as_database_error)
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

/// Trim and validate the title and text fields
fn validate_fields(title: &str, text: &str) -> Result<(String, String), NoteServiceError> {
    let title = title.trim();
    let text = text.trim();
    if title.is_empty() {
        return Err(NoteServiceError::ValidationError(
            "Title cannot be empty".to_string(),
        ));
    }
    if title.len() > 100 {
        return Err(NoteServiceError::ValidationError(
            "Title must be at most 100 characters".to_string(),
        ));
    }
    if text.is_empty() {
        return Err(NoteServiceError::ValidationError(
            "Text cannot be empty".to_string(),
        ));
    }
    Ok((title.to_string(), text.to_string()))
}
