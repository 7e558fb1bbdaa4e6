//! Note pages
//!
//! The whole notes section sits behind the login layer. Every page only ever
//! shows the visitor's own notes; someone else's slug answers 404. Create,
//! edit and delete all land on the done page afterwards.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;

use crate::models::{NoteInput, User};
use crate::services::NoteServiceError;
use crate::web::middleware::{AppState, CurrentUser, PageError};

#[derive(Debug, Deserialize)]
pub struct NoteForm {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub slug: String,
}

impl NoteForm {
    fn into_input(self) -> NoteInput {
        let slug = self.slug.trim().to_string();
        NoteInput::new(self.title, self.text, (!slug.is_empty()).then_some(slug))
    }
}

/// GET /notes
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response, PageError> {
    let user = require_user(&current)?;
    let notes = state.note_service.list(user.id).await.map_err(page_error)?;

    let mut context = state.page_context(&current.0);
    context.insert("notes", &notes);
    Ok(state.render("notes/list.html", &context)?.into_response())
}

/// GET /notes/add
pub async fn add_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response, PageError> {
    let context = state.page_context(&current.0);
    Ok(state.render("notes/form.html", &context)?.into_response())
}

/// POST /notes/add
pub async fn add_submit(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Form(form): Form<NoteForm>,
) -> Result<Response, PageError> {
    let user = require_user(&current)?;
    let input = form.into_input();
    match state.note_service.create(user.id, &input).await {
        Ok(_) => Ok(Redirect::to("/notes/done").into_response()),
        Err(err @ (NoteServiceError::DuplicateSlug(_) | NoteServiceError::ValidationError(_))) => {
            let mut context = state.page_context(&current.0);
            context.insert("form_error", &err.to_string());
            insert_form(&mut context, &input);
            Ok(state.render("notes/form.html", &context)?.into_response())
        }
        Err(other) => Err(page_error(other)),
    }
}

/// GET /notes/done
pub async fn done(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response, PageError> {
    let context = state.page_context(&current.0);
    Ok(state.render("notes/done.html", &context)?.into_response())
}

/// GET /notes/{slug}
pub async fn detail(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(slug): Path<String>,
) -> Result<Response, PageError> {
    let user = require_user(&current)?;
    let note = state
        .note_service
        .get_for_owner(&slug, user.id)
        .await
        .map_err(page_error)?;

    let mut context = state.page_context(&current.0);
    context.insert("note", &note);
    Ok(state.render("notes/detail.html", &context)?.into_response())
}

/// GET /notes/{slug}/edit
pub async fn edit_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(slug): Path<String>,
) -> Result<Response, PageError> {
    let user = require_user(&current)?;
    let note = state
        .note_service
        .get_for_owner(&slug, user.id)
        .await
        .map_err(page_error)?;

    let mut context = state.page_context(&current.0);
    context.insert("note", &note);
    context.insert("form_title", &note.title);
    context.insert("form_text", &note.text);
    context.insert("form_slug", &note.slug);
    Ok(state.render("notes/form.html", &context)?.into_response())
}

/// POST /notes/{slug}/edit
pub async fn edit_submit(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(slug): Path<String>,
    Form(form): Form<NoteForm>,
) -> Result<Response, PageError> {
    let user = require_user(&current)?;
    let input = form.into_input();
    match state.note_service.update(&slug, user.id, &input).await {
        Ok(_) => Ok(Redirect::to("/notes/done").into_response()),
        Err(err @ (NoteServiceError::DuplicateSlug(_) | NoteServiceError::ValidationError(_))) => {
            let note = state
                .note_service
                .get_for_owner(&slug, user.id)
                .await
                .map_err(page_error)?;

            let mut context = state.page_context(&current.0);
            context.insert("note", &note);
            context.insert("form_error", &err.to_string());
            insert_form(&mut context, &input);
            Ok(state.render("notes/form.html", &context)?.into_response())
        }
        Err(other) => Err(page_error(other)),
    }
}

/// GET /notes/{slug}/delete
pub async fn delete_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(slug): Path<String>,
) -> Result<Response, PageError> {
    let user = require_user(&current)?;
    let note = state
        .note_service
        .get_for_owner(&slug, user.id)
        .await
        .map_err(page_error)?;

    let mut context = state.page_context(&current.0);
    context.insert("note", &note);
    Ok(state.render("notes/delete.html", &context)?.into_response())
}

/// POST /notes/{slug}/delete
pub async fn delete_submit(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(slug): Path<String>,
) -> Result<Response, PageError> {
    let user = require_user(&current)?;
    state
        .note_service
        .delete(&slug, user.id)
        .await
        .map_err(page_error)?;
    Ok(Redirect::to("/notes/done").into_response())
}

fn insert_form(context: &mut tera::Context, input: &NoteInput) {
    context.insert("form_title", &input.title);
    context.insert("form_text", &input.text);
    context.insert("form_slug", input.slug.as_deref().unwrap_or(""));
}

/// These routes sit behind the login layer, so a missing user is a bug
fn require_user(current: &CurrentUser) -> Result<&User, PageError> {
    current
        .0
        .as_ref()
        .ok_or_else(|| PageError::Internal(anyhow::anyhow!("Missing authenticated user")))
}

fn page_error(err: NoteServiceError) -> PageError {
    match err {
        NoteServiceError::NotFound => PageError::NotFound,
        NoteServiceError::InternalError(e) => PageError::Internal(e),
        other => PageError::Internal(anyhow::anyhow!(other)),
    }
}
