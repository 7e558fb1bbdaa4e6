//! Services layer - business logic
//!
//! Services are responsible for:
//! - Implementing business rules (validation, authorization)
//! - Coordinating between repositories and cache
//! - Mapping failures to typed error cases

pub mod comment;
pub mod markdown;
pub mod news;
pub mod note;
pub mod password;
pub mod slug;
pub mod user;

pub use comment::{CommentService, CommentServiceError, BAD_WORDS, BAD_WORDS_WARNING};
pub use markdown::render_markdown;
pub use news::{NewsDetail, NewsService};
pub use note::{duplicate_slug_warning, NoteService, NoteServiceError};
pub use password::{hash_password, verify_password};
pub use slug::slugify;
pub use user::{LoginInput, RegisterInput, UserService, UserServiceError};
