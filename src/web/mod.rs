//! Web layer - HTTP handlers and routing
//!
//! Server-rendered pages for the news feed, the notes manager and the auth
//! flows. Routing splits into a public router and a login-only router; the
//! current user is resolved once per request by a shared middleware.

pub mod auth;
pub mod comments;
pub mod middleware;
pub mod news;
pub mod notes;
pub mod templates;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use middleware::{AppState, CurrentUser, PageError};
pub use templates::build_tera;

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> Router {
    // Login-only routes. Comment posting is the one authenticated action
    // handled outside this layer, because it shares its path with the
    // public detail page.
    let protected_routes = Router::new()
        .route("/notes", get(notes::list))
        .route("/notes/add", get(notes::add_page).post(notes::add_submit))
        .route("/notes/done", get(notes::done))
        .route("/notes/{slug}", get(notes::detail))
        .route(
            "/notes/{slug}/edit",
            get(notes::edit_page).post(notes::edit_submit),
        )
        .route(
            "/notes/{slug}/delete",
            get(notes::delete_page).post(notes::delete_submit),
        )
        .route(
            "/comments/{id}/edit",
            get(comments::edit_page).post(comments::edit_submit),
        )
        .route(
            "/comments/{id}/delete",
            get(comments::delete_page).post(comments::delete_submit),
        )
        .route_layer(axum_middleware::from_fn(middleware::require_login));

    // Public routes
    Router::new()
        .route("/", get(news::home))
        .route("/news/{id}", get(news::detail).post(comments::create))
        .route("/auth/login", get(auth::login_page).post(auth::login_submit))
        .route("/auth/logout", get(auth::logout).post(auth::logout))
        .route(
            "/auth/signup",
            get(auth::signup_page).post(auth::signup_submit),
        )
        .merge(protected_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::load_current_user,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
