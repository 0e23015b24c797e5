/// Follow service - reader to author subscriptions and profile summaries
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::db::BlogRepository;
use crate::error::{AppError, Result};
use crate::models::{FeedScope, User};
use crate::services::posts::ensure_user;

/// Header data of a profile page.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub username: String,
    pub posts_count: usize,
    pub followers_count: usize,
    /// Whether the viewing user follows this author
    pub following: bool,
}

#[derive(Clone)]
pub struct FollowService {
    repo: Arc<dyn BlogRepository>,
}

impl FollowService {
    pub fn new(repo: Arc<dyn BlogRepository>) -> Self {
        Self { repo }
    }

    async fn author(&self, username: &str) -> Result<User> {
        self.repo
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", username)))
    }

    /// Idempotent follow; returns true if a new subscription was written.
    ///
    /// Following yourself is a no-op.
    pub async fn follow(&self, user_id: i64, username: &str) -> Result<bool> {
        let author = self.author(username).await?;
        if author.id == user_id {
            debug!(user_id, "self-follow ignored");
            return Ok(false);
        }

        ensure_user(self.repo.as_ref(), user_id).await?;
        let created = self.repo.create_follow(user_id, author.id).await?;
        if created {
            info!(user_id, author_id = author.id, "follow created");
        }
        Ok(created)
    }

    /// Idempotent unfollow; returns true if a subscription was removed.
    pub async fn unfollow(&self, user_id: i64, username: &str) -> Result<bool> {
        let author = self.author(username).await?;
        let removed = self.repo.delete_follow(user_id, author.id).await?;
        if removed {
            info!(user_id, author_id = author.id, "follow removed");
        }
        Ok(removed)
    }

    /// Profile header for `username` as seen by `viewer`.
    pub async fn profile(&self, username: &str, viewer: Option<i64>) -> Result<ProfileSummary> {
        let author = self.author(username).await?;

        let posts_count = self
            .repo
            .count_posts(&FeedScope::Profile(author.username.clone()))
            .await?;
        let followers_count = self.repo.count_followers(author.id).await?;
        let following = match viewer {
            Some(viewer_id) if viewer_id != author.id => {
                self.repo.is_following(viewer_id, author.id).await?
            }
            _ => false,
        };

        Ok(ProfileSummary {
            username: author.username,
            posts_count,
            followers_count,
            following,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryRepository;

    async fn setup() -> (FollowService, Arc<InMemoryRepository>, User, User) {
        let repo = Arc::new(InMemoryRepository::new());
        let reader = repo.create_user("reader").await.unwrap();
        let author = repo.create_user("author").await.unwrap();
        (FollowService::new(repo.clone()), repo, reader, author)
    }

    #[tokio::test]
    async fn test_follow_is_idempotent() {
        let (service, repo, reader, author) = setup().await;

        assert!(service.follow(reader.id, "author").await.unwrap());
        assert!(!service.follow(reader.id, "author").await.unwrap());
        assert_eq!(repo.count_followers(author.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_self_follow_is_noop() {
        let (service, repo, _, author) = setup().await;

        assert!(!service.follow(author.id, "author").await.unwrap());
        assert_eq!(repo.count_followers(author.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unfollow_without_follow() {
        let (service, repo, reader, author) = setup().await;

        assert!(!service.unfollow(reader.id, "author").await.unwrap());
        service.follow(reader.id, "author").await.unwrap();
        assert!(service.unfollow(reader.id, "author").await.unwrap());
        assert!(!repo.is_following(reader.id, author.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_profile_reports_following() {
        let (service, _, reader, _) = setup().await;
        service.follow(reader.id, "author").await.unwrap();

        let seen_by_reader = service.profile("author", Some(reader.id)).await.unwrap();
        assert!(seen_by_reader.following);
        assert_eq!(seen_by_reader.followers_count, 1);

        let seen_by_guest = service.profile("author", None).await.unwrap();
        assert!(!seen_by_guest.following);

        let err = service.profile("nobody", None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
