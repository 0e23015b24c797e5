/// Database access layer
///
/// This module provides:
/// - `BlogRepository`: the storage seam used by every service
/// - `PgBlogRepository`: PostgreSQL implementation
/// - `InMemoryRepository`: process-local implementation
/// - Connection pooling and embedded migrations
pub mod memory;
pub mod pool;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use pool::{create_pool, init_pool, DbConfig, MIGRATOR};
pub use postgres::PgBlogRepository;

use crate::error::Result;
use crate::models::{
    Comment, CommentView, FeedScope, Group, NewGroup, Post, PostChanges, PostView, User,
};

/// Storage operations for users, groups, posts, comments and follows.
///
/// Feed queries filter by scope and order by publish date descending, ties
/// broken by id descending. A scope whose key matches nothing is an empty
/// feed, not an error.
#[async_trait::async_trait]
pub trait BlogRepository: Send + Sync {
    /// Register a user provisioned by the auth gateway
    async fn create_user(&self, username: &str) -> Result<User>;

    async fn find_user(&self, user_id: i64) -> Result<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn create_group(&self, group: NewGroup) -> Result<Group>;

    async fn find_group(&self, group_id: i64) -> Result<Option<Group>>;

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>>;

    /// Number of posts in a feed
    async fn count_posts(&self, scope: &FeedScope) -> Result<usize>;

    /// One slice of a feed, newest first
    async fn list_posts(
        &self,
        scope: &FeedScope,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<PostView>>;

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>>;

    async fn find_post_view(&self, post_id: i64) -> Result<Option<PostView>>;

    /// Insert a post; the publish date is assigned here and never changes
    async fn create_post(&self, author_id: i64, changes: PostChanges) -> Result<Post>;

    /// Replace text, group and image. Returns `None` when the post is gone.
    async fn update_post(&self, post_id: i64, changes: PostChanges) -> Result<Option<Post>>;

    async fn create_comment(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment>;

    /// Comments on a post, oldest first
    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>>;

    /// Insert the pair unless present; true when a row was written
    async fn create_follow(&self, user_id: i64, author_id: i64) -> Result<bool>;

    /// Remove the pair if present; true when a row was removed
    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool>;

    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool>;

    async fn count_followers(&self, author_id: i64) -> Result<usize>;
}
