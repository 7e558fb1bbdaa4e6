//! Shared fixtures for the HTTP test suites
//!
//! Each test gets its own in-memory database and router. Separate browser
//! sessions against the same app are modelled as separate `TestServer`
//! clients sharing the state.

use axum_test::TestServer;
use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;

use notepress::cache::MemoryCache;
use notepress::db::repositories::{
    CommentRepository, NewsRepository, NoteRepository, SqlxCommentRepository, SqlxNewsRepository,
    SqlxNoteRepository, SqlxSessionRepository, SqlxUserRepository,
};
use notepress::db::{create_test_pool, migrations};
use notepress::models::{Comment, CommentInput, News, NewsInput, Note, User};
use notepress::services::{
    CommentService, NewsService, NoteService, RegisterInput, UserService,
};
use notepress::web::{build_router, build_tera, AppState};

pub const HOME_PAGE_CAP: i64 = 10;

pub struct TestApp {
    pub state: AppState,
    pub news_repo: Arc<dyn NewsRepository>,
    pub comment_repo: Arc<dyn CommentRepository>,
    pub note_repo: Arc<dyn NoteRepository>,
    pub user_service: Arc<UserService>,
    pub note_service: Arc<NoteService>,
}

pub async fn spawn_app() -> TestApp {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let news_repo = SqlxNewsRepository::boxed(pool.clone());
    let comment_repo = SqlxCommentRepository::boxed(pool.clone());
    let note_repo = SqlxNoteRepository::boxed(pool.clone());

    let cache = Arc::new(MemoryCache::new(std::time::Duration::from_secs(60)));
    let user_service = Arc::new(UserService::new(user_repo, session_repo));
    let news_service = Arc::new(NewsService::new(
        news_repo.clone(),
        comment_repo.clone(),
        cache,
        HOME_PAGE_CAP,
    ));
    let comment_service = Arc::new(CommentService::new(comment_repo.clone(), news_repo.clone()));
    let note_service = Arc::new(NoteService::new(note_repo.clone()));

    let state = AppState {
        user_service: user_service.clone(),
        news_service,
        comment_service,
        note_service: note_service.clone(),
        tera: Arc::new(build_tera().expect("Failed to build templates")),
    };

    TestApp {
        state,
        news_repo,
        comment_repo,
        note_repo,
        user_service,
        note_service,
    }
}

impl TestApp {
    /// A fresh browser session against this app
    pub fn client(&self) -> TestServer {
        TestServer::builder()
            .save_cookies()
            .build(build_router(self.state.clone()))
            .expect("Failed to build test server")
    }

    /// Register a user and log a fresh client in as them
    pub async fn login_as(&self, username: &str) -> (TestServer, User) {
        let user = self.register(username).await;
        let client = self.client();
        let response = client
            .post("/auth/login")
            .form(&[("username", username), ("password", "password123")])
            .await;
        response.assert_status(axum::http::StatusCode::SEE_OTHER);
        (client, user)
    }

    pub async fn register(&self, username: &str) -> User {
        self.user_service
            .register(RegisterInput::new(username, "password123"))
            .await
            .expect("Failed to register user")
    }

    pub async fn create_news(&self, title: &str, text: &str, date: NaiveDate) -> News {
        self.news_repo
            .create(&NewsInput::new(title, text, date))
            .await
            .expect("Failed to create news")
    }

    /// A comment with a deterministic creation time
    pub async fn create_comment(
        &self,
        news_id: i64,
        author_id: i64,
        text: &str,
        age_minutes: i64,
    ) -> Comment {
        let comment = self
            .comment_repo
            .create(&CommentInput {
                news_id,
                author_id,
                text: text.to_string(),
            })
            .await
            .expect("Failed to create comment");
        self.comment_repo
            .set_created(comment.id, Utc::now() - Duration::minutes(age_minutes))
            .await
            .expect("Failed to set comment time");
        comment
    }

    pub async fn create_note(&self, author_id: i64, title: &str, slug: &str) -> Note {
        self.note_repo
            .create(&Note {
                id: 0,
                title: title.to_string(),
                text: "Note text".to_string(),
                slug: slug.to_string(),
                author_id,
            })
            .await
            .expect("Failed to create note")
    }

    pub async fn comment_count(&self) -> i64 {
        self.comment_repo.count().await.expect("Failed to count comments")
    }

    pub async fn note_count(&self) -> i64 {
        self.note_repo.count().await.expect("Failed to count notes")
    }
}

/// Today plus an offset, for spreading news items across dates
pub fn date_days_ago(days: i64) -> NaiveDate {
    (Utc::now() - Duration::days(days)).date_naive()
}

/// Where a redirect points, as a string
pub fn location(response: &axum_test::TestResponse) -> String {
    response
        .header("location")
        .to_str()
        .expect("Location header is not valid UTF-8")
        .to_string()
}

/// Assert a response is the login redirect for `next`
pub fn assert_login_redirect(response: &axum_test::TestResponse, next: &str) {
    response.assert_status(axum::http::StatusCode::SEE_OTHER);
    assert_eq!(
        location(response),
        format!("/auth/login?next={}", urlencoding::encode(next))
    );
}
