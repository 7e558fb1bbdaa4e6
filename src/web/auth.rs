//! Login, logout and signup pages

use axum::{
    extract::{Query, State},
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;

use crate::services::{LoginInput, RegisterInput, UserServiceError};
use crate::web::middleware::{AppState, CurrentUser, PageError};

const SESSION_COOKIE_CLEAR: &str = "session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";

fn session_cookie(token: &str) -> String {
    format!("session={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// Destination after login: the `next` parameter, or the home page
fn post_login_target(next: Option<&str>) -> String {
    match next {
        // Only same-site paths, an absolute URL here would be an open redirect
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => "/".to_string(),
    }
}

#[derive(Debug, Deserialize)]
pub struct NextParam {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
}

/// GET /auth/login
pub async fn login_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<NextParam>,
) -> Result<Response, PageError> {
    let mut context = state.page_context(&current.0);
    if let Some(next) = &params.next {
        context.insert("next", next);
    }
    Ok(state.render("auth/login.html", &context)?.into_response())
}

/// POST /auth/login
pub async fn login_submit(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    let input = LoginInput::new(form.username.clone(), form.password);
    match state.user_service.login(input).await {
        Ok(session) => {
            let target = post_login_target(form.next.as_deref());
            Ok((
                AppendHeaders([(SET_COOKIE, session_cookie(&session.id))]),
                Redirect::to(&target),
            )
                .into_response())
        }
        Err(UserServiceError::AuthenticationError(_)) => {
            let mut context = state.page_context(&current.0);
            context.insert("error", "Invalid username or password");
            context.insert("username", &form.username);
            if let Some(next) = &form.next {
                context.insert("next", next);
            }
            Ok(state.render("auth/login.html", &context)?.into_response())
        }
        Err(e) => Err(PageError::Internal(e.into())),
    }
}

/// GET or POST /auth/logout
///
/// Deletes the session if one exists, clears the cookie and renders a
/// logged-out page. Safe to hit while already anonymous.
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    request: axum::extract::Request,
) -> Result<Response, PageError> {
    if current.0.is_some() {
        if let Some(token) = crate::web::middleware::extract_session_token(&request) {
            state.user_service.logout(&token).await?;
        }
    }

    let context = state.page_context(&None);
    let page = state.render("auth/logout.html", &context)?;
    Ok((AppendHeaders([(SET_COOKIE, SESSION_COOKIE_CLEAR)]), page).into_response())
}

/// GET /auth/signup
pub async fn signup_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response, PageError> {
    let context = state.page_context(&current.0);
    Ok(state.render("auth/signup.html", &context)?.into_response())
}

/// POST /auth/signup
pub async fn signup_submit(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Form(form): Form<SignupForm>,
) -> Result<Response, PageError> {
    let input = RegisterInput::new(form.username.clone(), form.password);
    match state.user_service.register(input).await {
        Ok(_) => Ok(Redirect::to("/auth/login").into_response()),
        Err(UserServiceError::UserExists(_)) => {
            let mut context = state.page_context(&current.0);
            context.insert("error", "A user with that username already exists");
            context.insert("username", &form.username);
            Ok(state.render("auth/signup.html", &context)?.into_response())
        }
        Err(UserServiceError::ValidationError(message)) => {
            let mut context = state.page_context(&current.0);
            context.insert("error", &message);
            context.insert("username", &form.username);
            Ok(state.render("auth/signup.html", &context)?.into_response())
        }
        Err(e) => Err(PageError::Internal(e.into())),
    }
}
