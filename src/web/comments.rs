//! Comment handlers
//!
//! Comments are posted to the news detail URL and every successful mutation
//! redirects back to the thread anchor on that page. Edit and delete pages
//! answer 404 unless the visitor is the comment's author.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;

use crate::models::User;
use crate::services::CommentServiceError;
use crate::web::middleware::{login_redirect_for, AppState, CurrentUser, PageError};
use crate::web::news::detail_context;

/// Redirect target after a successful comment mutation
fn thread_redirect(news_id: i64) -> Redirect {
    Redirect::to(&format!("/news/{news_id}#comments"))
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub text: String,
}

/// POST /news/{id}
///
/// The detail page is public, so login is enforced here rather than by a
/// route layer: anonymous posters are sent to the login page with a `next`
/// back to the article.
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(news_id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Result<Response, PageError> {
    let user = match &current.0 {
        Some(user) => user.clone(),
        None => return Ok(login_redirect_for(&format!("/news/{news_id}")).into_response()),
    };

    match state
        .comment_service
        .create(news_id, user.id, &form.text)
        .await
    {
        Ok(_) => Ok(thread_redirect(news_id).into_response()),
        Err(err @ (CommentServiceError::ProhibitedWords | CommentServiceError::EmptyText)) => {
            let error = err.to_string();
            let context =
                detail_context(&state, &current, news_id, Some(&error), Some(&form.text)).await?;
            Ok(state.render("news/detail.html", &context)?.into_response())
        }
        Err(CommentServiceError::NotFound) => Err(PageError::NotFound),
        Err(CommentServiceError::InternalError(e)) => Err(PageError::Internal(e)),
    }
}

/// GET /comments/{id}/edit
pub async fn edit_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Response, PageError> {
    let user = require_user(&current)?;
    let comment = state
        .comment_service
        .get_for_author(id, user.id)
        .await
        .map_err(page_error)?;

    let mut context = state.page_context(&current.0);
    context.insert("comment", &comment);
    Ok(state.render("comments/edit.html", &context)?.into_response())
}

/// POST /comments/{id}/edit
pub async fn edit_submit(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Result<Response, PageError> {
    let user = require_user(&current)?;
    match state.comment_service.edit(id, user.id, &form.text).await {
        Ok(comment) => Ok(thread_redirect(comment.news_id).into_response()),
        Err(err @ (CommentServiceError::ProhibitedWords | CommentServiceError::EmptyText)) => {
            let message = err.to_string();
            let comment = state
                .comment_service
                .get_for_author(id, user.id)
                .await
                .map_err(page_error)?;

            let mut context = state.page_context(&current.0);
            context.insert("comment", &comment);
            context.insert("form_error", &message);
            context.insert("form_text", &form.text);
            Ok(state.render("comments/edit.html", &context)?.into_response())
        }
        Err(other) => Err(page_error(other)),
    }
}

/// GET /comments/{id}/delete
pub async fn delete_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Response, PageError> {
    let user = require_user(&current)?;
    let comment = state
        .comment_service
        .get_for_author(id, user.id)
        .await
        .map_err(page_error)?;

    let mut context = state.page_context(&current.0);
    context.insert("comment", &comment);
    Ok(state
        .render("comments/delete.html", &context)?
        .into_response())
}

/// POST /comments/{id}/delete
pub async fn delete_submit(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Response, PageError> {
    let user = require_user(&current)?;
    let comment = state
        .comment_service
        .delete(id, user.id)
        .await
        .map_err(page_error)?;
    Ok(thread_redirect(comment.news_id).into_response())
}

/// These routes sit behind the login layer, so a missing user is a bug
fn require_user(current: &CurrentUser) -> Result<&User, PageError> {
    current
        .0
        .as_ref()
        .ok_or_else(|| PageError::Internal(anyhow::anyhow!("Missing authenticated user")))
}

fn page_error(err: CommentServiceError) -> PageError {
    match err {
        CommentServiceError::NotFound => PageError::NotFound,
        CommentServiceError::InternalError(e) => PageError::Internal(e),
        other => PageError::Internal(anyhow::anyhow!(other)),
    }
}
