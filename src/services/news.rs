//! News service
//!
//! Read-side business logic for the news feed: the capped home-page listing
//! (newest first, served through the cache) and detail lookup with the
//! comment thread in chronological order.

use crate::cache::MemoryCache;
use crate::db::repositories::{CommentRepository, NewsRepository};
use crate::models::{CommentWithAuthor, News};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Cache key for the home-page listing
const HOME_CACHE_KEY: &str = "news:home";

/// A news item together with its comment thread, oldest comment first
#[derive(Debug, Clone)]
pub struct NewsDetail {
    pub news: News,
    pub comments: Vec<CommentWithAuthor>,
}

/// News service
pub struct NewsService {
    news_repo: Arc<dyn NewsRepository>,
    comment_repo: Arc<dyn CommentRepository>,
    cache: Arc<MemoryCache>,
    home_page_count: i64,
}

impl NewsService {
    pub fn new(
        news_repo: Arc<dyn NewsRepository>,
        comment_repo: Arc<dyn CommentRepository>,
        cache: Arc<MemoryCache>,
        home_page_count: i64,
    ) -> Self {
        Self {
            news_repo,
            comment_repo,
            cache,
            home_page_count,
        }
    }

    /// List the news items for the home page: newest date first, at most
    /// the configured count. Served from cache when warm.
    pub async fn home_page(&self) -> Result<Vec<News>> {
        if let Some(cached) = self.cache.get::<Vec<News>>(HOME_CACHE_KEY).await? {
            return Ok(cached);
        }

        let listed = self
            .news_repo
            .list_latest(self.home_page_count)
            .await
            .context("Failed to list home-page news")?;

        self.cache.set(HOME_CACHE_KEY, &listed).await?;
        Ok(listed)
    }

    /// Fetch one news item with its comment thread.
    ///
    /// Returns `None` when the id does not exist.
    pub async fn detail(&self, id: i64) -> Result<Option<NewsDetail>> {
        let news = match self.news_repo.get_by_id(id).await? {
            Some(news) => news,
            None => return Ok(None),
        };

        let comments = self
            .comment_repo
            .list_for_news(news.id)
            .await
            .context("Failed to list comments")?;

        Ok(Some(NewsDetail { news, comments }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxCommentRepository, SqlxNewsRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::NewsInput;
    use chrono::NaiveDate;
    use std::time::Duration;

    async fn setup(home_page_count: i64) -> (Arc<dyn NewsRepository>, NewsService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let news_repo = SqlxNewsRepository::boxed(pool.clone());
        let comment_repo = SqlxCommentRepository::boxed(pool.clone());
        let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
        let service = NewsService::new(news_repo.clone(), comment_repo, cache, home_page_count);

        (news_repo, service)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).expect("valid date")
    }

    #[tokio::test]
    async fn test_home_page_caps_and_orders() {
        let (repo, service) = setup(2).await;
        for d in 1..=3 {
            repo.create(&NewsInput::new(format!("News {}", d), "x", day(d)))
                .await
                .expect("Failed to create news");
        }

        let listed = service.home_page().await.expect("Failed to list");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].title, "News 3");
        assert_eq!(listed[1].title, "News 2");
    }

    #[tokio::test]
    async fn test_home_page_serves_cached_listing() {
        let (repo, service) = setup(10).await;
        repo.create(&NewsInput::new("Only", "x", day(1)))
            .await
            .expect("Failed to create news");

        let first = service.home_page().await.expect("Failed to list");
        assert_eq!(first.len(), 1);

        // A row added behind the cache is invisible until the TTL lapses
        repo.create(&NewsInput::new("Later", "x", day(2)))
            .await
            .expect("Failed to create news");
        let second = service.home_page().await.expect("Failed to list");
        assert_eq!(second.len(), 1);
    }

    #[tokio::test]
    async fn test_detail_missing_returns_none() {
        let (_repo, service) = setup(10).await;

        let detail = service.detail(999).await.expect("Failed to fetch detail");
        assert!(detail.is_none());
    }

    #[tokio::test]
    async fn test_detail_includes_news() {
        let (repo, service) = setup(10).await;
        let news = repo
            .create(&NewsInput::new("Headline", "Body", day(1)))
            .await
            .expect("Failed to create news");

        let detail = service
            .detail(news.id)
            .await
            .expect("Failed to fetch detail")
            .expect("News should exist");
        assert_eq!(detail.news.title, "Headline");
        assert!(detail.comments.is_empty());
    }
}
