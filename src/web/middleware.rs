//! Web middleware
//!
//! Contains middleware for:
//! - Resolving the current user from the session cookie
//! - Redirecting anonymous visitors away from login-only pages

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tera::Tera;

use crate::models::User;
use crate::services::{CommentService, NewsService, NoteService, UserService};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub news_service: Arc<NewsService>,
    pub comment_service: Arc<CommentService>,
    pub note_service: Arc<NoteService>,
    pub tera: Arc<Tera>,
}

impl AppState {
    /// Base template context for a page
    pub fn page_context(&self, current_user: &Option<User>) -> tera::Context {
        let mut context = tera::Context::new();
        if let Some(user) = current_user {
            context.insert("current_user", user);
        }
        context
    }

    /// Render a template into an HTML response
    pub fn render(&self, template: &str, context: &tera::Context) -> Result<Html<String>, PageError> {
        let html = self.tera.render(template, context).map_err(|e| {
            PageError::Internal(anyhow::anyhow!("Failed to render '{}': {}", template, e))
        })?;
        Ok(Html(html))
    }
}

/// The user resolved from the session cookie, if any
///
/// Inserted on every request by [`load_current_user`], so handlers can rely
/// on the extension being present.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

/// Error response for page handlers
#[derive(Debug)]
pub enum PageError {
    /// The resource does not exist, or the caller may not see it
    NotFound,
    /// Internal error
    Internal(anyhow::Error),
}

impl<E> From<E> for PageError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                Html("<h1>404 Not Found</h1>".to_string()),
            )
                .into_response(),
            Self::Internal(err) => {
                tracing::error!("Internal error while handling request: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html("<h1>500 Internal Server Error</h1>".to_string()),
                )
                    .into_response()
            }
        }
    }
}

/// Extract the session token from the request cookies
pub(crate) fn extract_session_token(request: &Request) -> Option<String> {
    let cookie_header = request.headers().get(header::COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;
    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some(token) = cookie.strip_prefix("session=") {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }
    None
}

/// Resolve the session cookie into a [`CurrentUser`] extension
///
/// Runs on every request. An invalid or expired token resolves to an
/// anonymous visitor, never an error.
pub async fn load_current_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let mut user = None;
    if let Some(token) = extract_session_token(&request) {
        match state.user_service.validate_session(&token).await {
            Ok(found) => user = found,
            Err(e) => tracing::warn!("Session validation failed: {}", e),
        }
    }
    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}

/// Redirect anonymous visitors to the login page
///
/// The original URL is carried in the `next` query parameter so the login
/// handler can send the visitor back after a successful login.
pub async fn require_login(request: Request, next: Next) -> Response {
    let authenticated = request
        .extensions()
        .get::<CurrentUser>()
        .is_some_and(|current| current.0.is_some());

    if !authenticated {
        return redirect_to_login(&request).into_response();
    }
    next.run(request).await
}

/// Build the login redirect for a request, preserving its path
pub fn login_redirect_for(path: &str) -> Redirect {
    Redirect::to(&format!("/auth/login?next={}", urlencoding::encode(path)))
}

fn redirect_to_login(request: &Request) -> Redirect {
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    login_redirect_for(path)
}
