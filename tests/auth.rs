//! HTTP tests for the login, logout and signup flows

mod common;

use axum::http::StatusCode;
use common::{location, spawn_app};

#[tokio::test]
async fn auth_pages_are_available_to_anonymous() {
    let app = spawn_app().await;
    for url in ["/auth/login", "/auth/logout", "/auth/signup"] {
        let response = app.client().get(url).await;
        response.assert_status_ok();
    }
}

#[tokio::test]
async fn signup_then_login() {
    let app = spawn_app().await;
    let client = app.client();

    let signup = client
        .post("/auth/signup")
        .form(&[("username", "newcomer"), ("password", "password123")])
        .await;
    signup.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&signup), "/auth/login");

    let login = client
        .post("/auth/login")
        .form(&[("username", "newcomer"), ("password", "password123")])
        .await;
    login.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&login), "/");

    let home = client.get("/").await.text();
    assert!(home.contains("newcomer"));
}

#[tokio::test]
async fn login_with_wrong_password_shows_error() {
    let app = spawn_app().await;
    app.register("resident").await;

    let response = app
        .client()
        .post("/auth/login")
        .form(&[("username", "resident"), ("password", "wrong")])
        .await;

    response.assert_status_ok();
    assert!(response.text().contains("Invalid username or password"));
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let app = spawn_app().await;
    app.register("resident").await;

    let response = app
        .client()
        .post("/auth/signup")
        .form(&[("username", "resident"), ("password", "password123")])
        .await;

    response.assert_status_ok();
    assert!(response.text().contains("already exists"));
}

#[tokio::test]
async fn login_honours_the_next_parameter() {
    let app = spawn_app().await;
    app.register("resident").await;

    let response = app
        .client()
        .post("/auth/login")
        .form(&[
            ("username", "resident"),
            ("password", "password123"),
            ("next", "/notes"),
        ])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/notes");
}

#[tokio::test]
async fn next_parameter_never_leaves_the_site() {
    let app = spawn_app().await;
    app.register("resident").await;

    let response = app
        .client()
        .post("/auth/login")
        .form(&[
            ("username", "resident"),
            ("password", "password123"),
            ("next", "https://evil.example/phish"),
        ])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = spawn_app().await;
    let (client, _) = app.login_as("resident").await;
    client.get("/notes").await.assert_status_ok();

    let logout = client.post("/auth/logout").await;
    logout.assert_status_ok();
    assert!(logout.text().contains("You have been logged out."));

    let after = client.get("/notes").await;
    after.assert_status(StatusCode::SEE_OTHER);
}
