//! News model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// News entity
///
/// News items are listed newest-date-first on the home page, capped at a
/// configured count. They have no authoring UI; rows enter the system
/// through the repository (seeding and tests).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct News {
    pub id: i64,
    pub title: String,
    pub text: String,
    /// Publication date (day resolution, like a newspaper issue)
    pub date: NaiveDate,
}

/// Input for creating a news item
#[derive(Debug, Clone, Deserialize)]
pub struct NewsInput {
    pub title: String,
    pub text: String,
    pub date: NaiveDate,
}

impl NewsInput {
    pub fn new(title: impl Into<String>, text: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            date,
        }
    }
}
