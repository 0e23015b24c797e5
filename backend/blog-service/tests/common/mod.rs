//! Shared fixtures for blog-service integration tests.
//!
//! Everything runs on the in-memory repository and page cache; the cache
//! clock is a `ManualClock` so TTL expiry is driven by the test.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use blog_service::cache::{IndexPageCache, ManualClock, MemoryPageCache};
use blog_service::config::DEFAULT_INDEX_CACHE_TTL_SECS;
use blog_service::db::{BlogRepository, InMemoryRepository};
use blog_service::handlers::AppState;
use blog_service::models::{Group, NewGroup, Post, PostChanges, User};
use blog_service::pagination::Paginator;

pub const USER_ID_HEADER: &str = "X-User-Id";

pub struct TestBlog {
    pub repo: Arc<InMemoryRepository>,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryPageCache>,
    pub state: AppState,
}

impl TestBlog {
    pub fn new() -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let clock = Arc::new(ManualClock::new());
        let store = Arc::new(MemoryPageCache::new(clock.clone()));
        let index_cache = IndexPageCache::new(
            store.clone(),
            Duration::from_secs(DEFAULT_INDEX_CACHE_TTL_SECS),
        );
        let state = AppState::new(repo.clone(), index_cache, Paginator::default());

        Self {
            repo,
            clock,
            store,
            state,
        }
    }

    pub async fn user(&self, username: &str) -> User {
        self.repo.create_user(username).await.expect("create user")
    }

    pub async fn group(&self, slug: &str, title: &str) -> Group {
        self.repo
            .create_group(NewGroup {
                title: title.to_string(),
                slug: slug.to_string(),
                description: format!("{} description", title),
            })
            .await
            .expect("create group")
    }

    pub async fn post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        self.repo
            .create_post(
                author.id,
                PostChanges {
                    text: text.to_string(),
                    group_id: group.map(|g| g.id),
                    image: None,
                },
            )
            .await
            .expect("create post")
    }
}

/// Build the blog app for a `TestBlog`, with every route mounted.
macro_rules! init_app {
    ($blog:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($blog.state.clone()))
                .configure(blog_service::handlers::configure),
        )
        .await
    };
}
