//! HTTP tests for the news feed and comment flows

mod common;

use axum::http::StatusCode;
use common::{assert_login_redirect, date_days_ago, location, spawn_app, HOME_PAGE_CAP};

#[tokio::test]
async fn home_page_is_available_to_anonymous() {
    let app = spawn_app().await;
    let response = app.client().get("/").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn detail_page_is_available_to_anonymous() {
    let app = spawn_app().await;
    let news = app.create_news("Headline", "Body", date_days_ago(0)).await;

    let response = app.client().get(&format!("/news/{}", news.id)).await;
    response.assert_status_ok();
    assert!(response.text().contains("Headline"));
}

#[tokio::test]
async fn missing_news_answers_not_found() {
    let app = spawn_app().await;
    let response = app.client().get("/news/999").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn home_page_shows_at_most_the_cap() {
    let app = spawn_app().await;
    for i in 0..HOME_PAGE_CAP + 1 {
        app.create_news(&format!("News {i:02}"), "Body", date_days_ago(i))
            .await;
    }

    let response = app.client().get("/").await;
    response.assert_status_ok();
    let body = response.text();
    assert_eq!(body.matches("news-card").count(), HOME_PAGE_CAP as usize);
}

#[tokio::test]
async fn home_page_is_ordered_newest_first() {
    let app = spawn_app().await;
    app.create_news("Oldest story", "Body", date_days_ago(2)).await;
    app.create_news("Middle story", "Body", date_days_ago(1)).await;
    app.create_news("Newest story", "Body", date_days_ago(0)).await;

    let body = app.client().get("/").await.text();
    let newest = body.find("Newest story").expect("newest shown");
    let middle = body.find("Middle story").expect("middle shown");
    let oldest = body.find("Oldest story").expect("oldest shown");
    assert!(newest < middle);
    assert!(middle < oldest);
}

#[tokio::test]
async fn comments_are_ordered_oldest_first() {
    let app = spawn_app().await;
    let news = app.create_news("Headline", "Body", date_days_ago(0)).await;
    let user = app.register("commenter").await;
    app.create_comment(news.id, user.id, "First comment", 30).await;
    app.create_comment(news.id, user.id, "Second comment", 10).await;

    let body = app.client().get(&format!("/news/{}", news.id)).await.text();
    let first = body.find("First comment").expect("first shown");
    let second = body.find("Second comment").expect("second shown");
    assert!(first < second);
}

#[tokio::test]
async fn anonymous_visitor_sees_no_comment_form() {
    let app = spawn_app().await;
    let news = app.create_news("Headline", "Body", date_days_ago(0)).await;

    let body = app.client().get(&format!("/news/{}", news.id)).await.text();
    assert!(!body.contains("id=\"comment-form\""));
}

#[tokio::test]
async fn logged_in_visitor_sees_comment_form() {
    let app = spawn_app().await;
    let news = app.create_news("Headline", "Body", date_days_ago(0)).await;
    let (client, _) = app.login_as("reader").await;

    let body = client.get(&format!("/news/{}", news.id)).await.text();
    assert!(body.contains("id=\"comment-form\""));
}

#[tokio::test]
async fn anonymous_cannot_post_comment() {
    let app = spawn_app().await;
    let news = app.create_news("Headline", "Body", date_days_ago(0)).await;

    let response = app
        .client()
        .post(&format!("/news/{}", news.id))
        .form(&[("text", "A comment")])
        .await;

    assert_login_redirect(&response, &format!("/news/{}", news.id));
    assert_eq!(app.comment_count().await, 0);
}

#[tokio::test]
async fn logged_in_user_can_post_comment() {
    let app = spawn_app().await;
    let news = app.create_news("Headline", "Body", date_days_ago(0)).await;
    let (client, _) = app.login_as("commenter").await;

    let response = client
        .post(&format!("/news/{}", news.id))
        .form(&[("text", "A thoughtful comment")])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/news/{}#comments", news.id));
    assert_eq!(app.comment_count().await, 1);

    let body = client.get(&format!("/news/{}", news.id)).await.text();
    assert!(body.contains("A thoughtful comment"));
    assert!(body.contains("commenter"));
}

#[tokio::test]
async fn comment_on_missing_news_answers_not_found() {
    let app = spawn_app().await;
    let (client, _) = app.login_as("commenter").await;

    let response = client
        .post("/news/999")
        .form(&[("text", "A thoughtful comment")])
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(app.comment_count().await, 0);
}

#[tokio::test]
async fn comment_with_bad_words_is_rejected() {
    let app = spawn_app().await;
    let news = app.create_news("Headline", "Body", date_days_ago(0)).await;
    let (client, _) = app.login_as("commenter").await;

    let response = client
        .post(&format!("/news/{}", news.id))
        .form(&[("text", "You are a scoundrel, sir")])
        .await;

    response.assert_status_ok();
    assert!(response.text().contains("Watch your language!"));
    assert_eq!(app.comment_count().await, 0);
}

#[tokio::test]
async fn author_can_edit_own_comment() {
    let app = spawn_app().await;
    let news = app.create_news("Headline", "Body", date_days_ago(0)).await;
    let (client, user) = app.login_as("author").await;
    let comment = app.create_comment(news.id, user.id, "original", 5).await;

    let page = client.get(&format!("/comments/{}/edit", comment.id)).await;
    page.assert_status_ok();

    let response = client
        .post(&format!("/comments/{}/edit", comment.id))
        .form(&[("text", "edited")])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/news/{}#comments", news.id));
    let body = client.get(&format!("/news/{}", news.id)).await.text();
    assert!(body.contains("edited"));
    assert!(!body.contains("original"));
}

#[tokio::test]
async fn author_can_delete_own_comment() {
    let app = spawn_app().await;
    let news = app.create_news("Headline", "Body", date_days_ago(0)).await;
    let (client, user) = app.login_as("author").await;
    let comment = app.create_comment(news.id, user.id, "doomed", 5).await;

    let page = client.get(&format!("/comments/{}/delete", comment.id)).await;
    page.assert_status_ok();

    let response = client
        .post(&format!("/comments/{}/delete", comment.id))
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/news/{}#comments", news.id));
    assert_eq!(app.comment_count().await, 0);
}

#[tokio::test]
async fn other_user_cannot_edit_comment() {
    let app = spawn_app().await;
    let news = app.create_news("Headline", "Body", date_days_ago(0)).await;
    let author = app.register("author").await;
    let comment = app.create_comment(news.id, author.id, "original", 5).await;
    let (client, _) = app.login_as("reader").await;

    let page = client.get(&format!("/comments/{}/edit", comment.id)).await;
    page.assert_status(StatusCode::NOT_FOUND);

    let response = client
        .post(&format!("/comments/{}/edit", comment.id))
        .form(&[("text", "hijacked")])
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body = app.client().get(&format!("/news/{}", news.id)).await.text();
    assert!(body.contains("original"));
}

#[tokio::test]
async fn other_user_cannot_delete_comment() {
    let app = spawn_app().await;
    let news = app.create_news("Headline", "Body", date_days_ago(0)).await;
    let author = app.register("author").await;
    let comment = app.create_comment(news.id, author.id, "safe", 5).await;
    let (client, _) = app.login_as("reader").await;

    let response = client
        .post(&format!("/comments/{}/delete", comment.id))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(app.comment_count().await, 1);
}

#[tokio::test]
async fn anonymous_is_redirected_from_comment_pages() {
    let app = spawn_app().await;
    let news = app.create_news("Headline", "Body", date_days_ago(0)).await;
    let author = app.register("author").await;
    let comment = app.create_comment(news.id, author.id, "text", 5).await;

    for page in ["edit", "delete"] {
        let url = format!("/comments/{}/{}", comment.id, page);
        let response = app.client().get(&url).await;
        assert_login_redirect(&response, &url);
    }
}
