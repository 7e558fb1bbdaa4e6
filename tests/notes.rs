//! HTTP tests for the notes manager

mod common;

use axum::http::StatusCode;
use common::{assert_login_redirect, location, spawn_app};
use notepress::db::repositories::NoteRepository;
use notepress::services::slugify;

#[tokio::test]
async fn anonymous_is_redirected_from_notes_pages() {
    let app = spawn_app().await;
    let owner = app.register("owner").await;
    app.create_note(owner.id, "Note", "note").await;

    for url in [
        "/notes",
        "/notes/add",
        "/notes/done",
        "/notes/note",
        "/notes/note/edit",
        "/notes/note/delete",
    ] {
        let response = app.client().get(url).await;
        assert_login_redirect(&response, url);
    }
}

#[tokio::test]
async fn notes_pages_are_available_to_owner() {
    let app = spawn_app().await;
    let (client, user) = app.login_as("owner").await;
    app.create_note(user.id, "Note", "note").await;

    for url in [
        "/notes",
        "/notes/add",
        "/notes/done",
        "/notes/note",
        "/notes/note/edit",
        "/notes/note/delete",
    ] {
        let response = client.get(url).await;
        response.assert_status_ok();
    }
}

#[tokio::test]
async fn note_pages_answer_not_found_to_other_user() {
    let app = spawn_app().await;
    let owner = app.register("owner").await;
    app.create_note(owner.id, "Secret", "secret").await;
    let (client, _) = app.login_as("reader").await;

    for url in ["/notes/secret", "/notes/secret/edit", "/notes/secret/delete"] {
        let response = client.get(url).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn list_shows_only_own_notes() {
    let app = spawn_app().await;
    let other = app.register("other").await;
    app.create_note(other.id, "Foreign note", "foreign").await;
    let (client, user) = app.login_as("owner").await;
    app.create_note(user.id, "My note", "mine").await;

    let body = client.get("/notes").await.text();
    assert!(body.contains("My note"));
    assert!(!body.contains("Foreign note"));
}

#[tokio::test]
async fn logged_in_user_can_create_note() {
    let app = spawn_app().await;
    let (client, user) = app.login_as("owner").await;

    let response = client
        .post("/notes/add")
        .form(&[
            ("title", "New note"),
            ("text", "Note text"),
            ("slug", "new-note"),
        ])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/notes/done");
    assert_eq!(app.note_count().await, 1);

    let note = app
        .note_repo
        .get_by_slug("new-note")
        .await
        .expect("Failed to look up note")
        .expect("Note was created");
    assert_eq!(note.title, "New note");
    assert_eq!(note.text, "Note text");
    assert_eq!(note.author_id, user.id);
}

#[tokio::test]
async fn anonymous_cannot_create_note() {
    let app = spawn_app().await;

    let response = app
        .client()
        .post("/notes/add")
        .form(&[("title", "New note"), ("text", "Note text"), ("slug", "")])
        .await;

    assert_login_redirect(&response, "/notes/add");
    assert_eq!(app.note_count().await, 0);
}

#[tokio::test]
async fn empty_slug_is_derived_from_title() {
    let app = spawn_app().await;
    let (client, _) = app.login_as("owner").await;

    let title = "Заголовок заметки";
    let response = client
        .post("/notes/add")
        .form(&[("title", title), ("text", "Note text"), ("slug", "")])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    let note = app
        .note_repo
        .get_by_slug(&slugify(title))
        .await
        .expect("Failed to look up note")
        .expect("Note was created with derived slug");
    assert_eq!(note.title, title);
}

#[tokio::test]
async fn duplicate_slug_is_rejected() {
    let app = spawn_app().await;
    let (client, user) = app.login_as("owner").await;
    app.create_note(user.id, "First", "taken").await;

    let response = client
        .post("/notes/add")
        .form(&[("title", "Second"), ("text", "Note text"), ("slug", "taken")])
        .await;

    response.assert_status_ok();
    assert!(response.text().contains("taken - this slug already exists"));
    assert_eq!(app.note_count().await, 1);
}

#[tokio::test]
async fn owner_can_edit_note() {
    let app = spawn_app().await;
    let (client, user) = app.login_as("owner").await;
    app.create_note(user.id, "Old title", "stable").await;

    let response = client
        .post("/notes/stable/edit")
        .form(&[
            ("title", "New title"),
            ("text", "New text"),
            ("slug", "stable"),
        ])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/notes/done");

    let note = app
        .note_repo
        .get_by_slug("stable")
        .await
        .expect("Failed to look up note")
        .expect("Note still exists");
    assert_eq!(note.title, "New title");
    assert_eq!(note.text, "New text");
}

#[tokio::test]
async fn other_user_cannot_edit_note() {
    let app = spawn_app().await;
    let owner = app.register("owner").await;
    app.create_note(owner.id, "Old title", "secret").await;
    let (client, _) = app.login_as("reader").await;

    let response = client
        .post("/notes/secret/edit")
        .form(&[
            ("title", "Hijacked"),
            ("text", "Hijacked"),
            ("slug", "secret"),
        ])
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let note = app
        .note_repo
        .get_by_slug("secret")
        .await
        .expect("Failed to look up note")
        .expect("Note still exists");
    assert_eq!(note.title, "Old title");
}

#[tokio::test]
async fn owner_can_delete_note() {
    let app = spawn_app().await;
    let (client, user) = app.login_as("owner").await;
    app.create_note(user.id, "Doomed", "doomed").await;

    let response = client.post("/notes/doomed/delete").await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/notes/done");
    assert_eq!(app.note_count().await, 0);
}

#[tokio::test]
async fn other_user_cannot_delete_note() {
    let app = spawn_app().await;
    let owner = app.register("owner").await;
    app.create_note(owner.id, "Safe", "safe").await;
    let (client, _) = app.login_as("reader").await;

    let response = client.post("/notes/safe/delete").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(app.note_count().await, 1);
}
