/// Feed service - assembles paginated post feeds for every scope
use std::sync::Arc;
use tracing::debug;

use crate::db::BlogRepository;
use crate::error::Result;
use crate::metrics::FEED_REQUEST_TOTAL;
use crate::models::{FeedScope, PostView};
use crate::pagination::{Page, PageNumber, PageWindow, Paginator};

/// The ordered posts of one scope, newest first.
///
/// Nothing is loaded up front; every `count` or `slice` call is a fresh
/// query, so a feed can be walked any number of times.
pub struct Feed<'a> {
    repo: &'a dyn BlogRepository,
    scope: FeedScope,
}

impl<'a> Feed<'a> {
    pub fn new(repo: &'a dyn BlogRepository, scope: FeedScope) -> Self {
        Self { repo, scope }
    }

    pub fn scope(&self) -> &FeedScope {
        &self.scope
    }

    pub async fn count(&self) -> Result<usize> {
        self.repo.count_posts(&self.scope).await
    }

    pub async fn slice(&self, offset: usize, limit: usize) -> Result<Vec<PostView>> {
        self.repo.list_posts(&self.scope, offset, limit).await
    }

    /// Items of a resolved window; skips the query for empty windows.
    pub async fn page(&self, window: PageWindow) -> Result<Page<PostView>> {
        let items = if window.item_count() == 0 {
            Vec::new()
        } else {
            self.slice(window.offset, window.limit).await?
        };
        Ok(Page::from_window(window, items))
    }
}

#[derive(Clone)]
pub struct FeedService {
    repo: Arc<dyn BlogRepository>,
    paginator: Paginator,
}

impl FeedService {
    pub fn new(repo: Arc<dyn BlogRepository>, paginator: Paginator) -> Self {
        Self { repo, paginator }
    }

    pub fn feed(&self, scope: FeedScope) -> Feed<'_> {
        Feed::new(self.repo.as_ref(), scope)
    }

    pub fn paginator(&self) -> Paginator {
        self.paginator
    }

    /// Resolve one page of a feed from a raw `page` query value.
    ///
    /// Bad page values never fail: they fall back to the first page, and
    /// pages past the end clamp to the last one. An unknown group slug or
    /// username gives an empty page.
    pub async fn resolve_page(
        &self,
        scope: &FeedScope,
        page_param: Option<&str>,
    ) -> Result<Page<PostView>> {
        let requested = PageNumber::parse(page_param);
        let feed = self.feed(scope.clone());

        let total = feed.count().await?;
        let window = self.paginator.window(total, requested);
        let page = feed.page(window).await?;

        FEED_REQUEST_TOTAL
            .with_label_values(&[scope.label()])
            .inc();
        debug!(
            scope = scope.label(),
            page = page.page_number,
            total_pages = page.total_pages,
            items = page.len(),
            "feed page resolved"
        );

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryRepository;
    use crate::models::{NewGroup, PostChanges};

    async fn service_with_posts(count: usize) -> (FeedService, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::new());
        let user = repo.create_user("User").await.unwrap();
        let group = repo
            .create_group(NewGroup {
                title: "группа".into(),
                slug: "group_slug".into(),
                description: "описание".into(),
            })
            .await
            .unwrap();
        for i in 0..count {
            repo.create_post(
                user.id,
                PostChanges {
                    text: format!("Пост номер {}", i),
                    group_id: Some(group.id),
                    image: None,
                },
            )
            .await
            .unwrap();
        }

        let service = FeedService::new(repo.clone(), Paginator::default());
        (service, repo)
    }

    #[tokio::test]
    async fn test_thirteen_posts_in_every_scope() {
        let (service, _) = service_with_posts(13).await;
        let scopes = [
            FeedScope::Index,
            FeedScope::Group("group_slug".into()),
            FeedScope::Profile("User".into()),
        ];

        for scope in scopes {
            let first = service.resolve_page(&scope, Some("1")).await.unwrap();
            assert_eq!(first.len(), 10, "{:?}", scope);
            assert!(first.has_next);

            let second = service.resolve_page(&scope, Some("2")).await.unwrap();
            assert_eq!(second.len(), 3, "{:?}", scope);
            assert!(!second.has_next);
        }
    }

    #[tokio::test]
    async fn test_unknown_scope_key_is_empty() {
        let (service, _) = service_with_posts(3).await;
        let page = service
            .resolve_page(&FeedScope::Group("missing".into()), None)
            .await
            .unwrap();

        assert!(page.is_empty());
        assert_eq!(page.page_number, 1);
        assert_eq!(page.total_pages, 0);
    }

    async fn walk(service: &FeedService, feed: &Feed<'_>) -> Vec<i64> {
        let mut ids = Vec::new();
        let total = feed.count().await.unwrap();
        for window in service.paginator().windows(total) {
            let page = feed.page(window).await.unwrap();
            ids.extend(page.items.into_iter().map(|p| p.id));
        }
        ids
    }

    #[tokio::test]
    async fn test_feed_can_be_walked_twice() {
        let (service, _) = service_with_posts(25).await;
        let feed = service.feed(FeedScope::Index);

        let first = walk(&service, &feed).await;
        let second = walk(&service, &feed).await;
        assert_eq!(first.len(), 25);
        assert_eq!(first, second);

        let mut unique = first.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 25);
    }

    #[tokio::test]
    async fn test_garbage_page_values_fall_back() {
        let (service, _) = service_with_posts(13).await;

        for raw in ["abc", "0", "-5", ""] {
            let page = service.resolve_page(&FeedScope::Index, Some(raw)).await.unwrap();
            assert_eq!(page.page_number, 1, "raw={:?}", raw);
        }

        let page = service
            .resolve_page(&FeedScope::Index, Some("999"))
            .await
            .unwrap();
        assert_eq!(page.page_number, 2);
        assert_eq!(page.len(), 3);
    }
}
