//! Data models
//!
//! This module contains all data structures used throughout Notepress.
//! Models represent:
//! - Database entities (User, Session, News, Comment, Note)
//! - Form input types

mod comment;
mod news;
mod note;
mod session;
mod user;

pub use comment::{Comment, CommentInput, CommentWithAuthor};
pub use news::{News, NewsInput};
pub use note::{Note, NoteInput};
pub use session::Session;
pub use user::User;
