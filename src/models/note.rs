//! Note model

use serde::{Deserialize, Serialize};

/// Note entity
///
/// A note is owned by exactly one user and addressed by a slug that is
/// unique across all notes. Visibility and mutation are restricted to the
/// owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub slug: String,
    pub author_id: i64,
}

/// Input for creating or updating a note
///
/// An empty slug means "derive one from the title".
#[derive(Debug, Clone, Deserialize)]
pub struct NoteInput {
    pub title: String,
    pub text: String,
    pub slug: Option<String>,
}

impl NoteInput {
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        slug: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            slug,
        }
    }
}
