//! News pages: the home feed and the detail page with its comment thread

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Extension,
};

use crate::services::render_markdown;
use crate::web::middleware::{AppState, CurrentUser, PageError};

/// GET /
pub async fn home(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response, PageError> {
    let news_list = state.news_service.home_page().await?;

    let mut context = state.page_context(&current.0);
    context.insert("news_list", &news_list);
    Ok(state.render("news/home.html", &context)?.into_response())
}

/// GET /news/{id}
pub async fn detail(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Response, PageError> {
    let context = detail_context(&state, &current, id, None, None).await?;
    Ok(state.render("news/detail.html", &context)?.into_response())
}

/// Build the detail page context, optionally carrying a rejected comment
/// form back to the visitor.
pub(crate) async fn detail_context(
    state: &AppState,
    current: &CurrentUser,
    id: i64,
    form_error: Option<&str>,
    form_text: Option<&str>,
) -> Result<tera::Context, PageError> {
    let detail = state
        .news_service
        .detail(id)
        .await?
        .ok_or(PageError::NotFound)?;

    let mut context = state.page_context(&current.0);
    context.insert("news", &detail.news);
    context.insert("news_html", &render_markdown(&detail.news.text));
    context.insert("comments", &detail.comments);
    if let Some(error) = form_error {
        context.insert("form_error", error);
    }
    if let Some(text) = form_text {
        context.insert("form_text", text);
    }
    Ok(context)
}
