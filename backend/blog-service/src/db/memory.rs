//! Process-local repository.
//!
//! Mirrors the PostgreSQL schema constraints: unique usernames and slugs,
//! unique follow pairs, and `ON DELETE SET NULL` semantics for groups.

use chrono::Utc;
use std::collections::HashSet;
use tokio::sync::RwLock;

use super::BlogRepository;
use crate::error::{AppError, Result};
use crate::models::{
    Comment, CommentView, FeedScope, Follow, Group, GroupRef, NewGroup, Post, PostChanges,
    PostView, User,
};

#[derive(Default)]
struct State {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    follows: Vec<Follow>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, user_id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    fn group(&self, group_id: i64) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    fn in_scope(&self, post: &Post, scope: &FeedScope) -> bool {
        match scope {
            FeedScope::Index => true,
            FeedScope::Group(slug) => post
                .group_id
                .and_then(|id| self.group(id))
                .is_some_and(|g| &g.slug == slug),
            FeedScope::Profile(username) => self
                .user(post.author_id)
                .is_some_and(|u| &u.username == username),
            FeedScope::Following(user_id) => self
                .follows
                .iter()
                .any(|f| f.user_id == *user_id && f.author_id == post.author_id),
        }
    }

    /// Posts in a scope, newest first.
    fn feed(&self, scope: &FeedScope) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self
            .posts
            .iter()
            .filter(|p| self.in_scope(p, scope))
            .collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        posts
    }

    fn view(&self, post: &Post) -> PostView {
        PostView {
            id: post.id,
            text: post.text.clone(),
            pub_date: post.pub_date,
            author: self
                .user(post.author_id)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            group: post.group_id.and_then(|id| self.group(id)).map(|g| GroupRef {
                slug: g.slug.clone(),
                title: g.title.clone(),
            }),
            image: post.image.clone(),
        }
    }

    fn check_user(&self, user_id: i64) -> Result<()> {
        match self.user(user_id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("user {}", user_id))),
        }
    }

    fn check_group(&self, group_id: Option<i64>) -> Result<()> {
        match group_id {
            Some(id) if self.group(id).is_none() => {
                Err(AppError::NotFound(format!("group {}", id)))
            }
            _ => Ok(()),
        }
    }
}

/// Repository held entirely in process memory
#[derive(Default)]
pub struct InMemoryRepository {
    state: RwLock<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete a group; its posts stay, without a group.
    pub async fn delete_group(&self, group_id: i64) -> bool {
        let mut state = self.state.write().await;
        let before = state.groups.len();
        state.groups.retain(|g| g.id != group_id);
        if state.groups.len() == before {
            return false;
        }
        for post in state.posts.iter_mut().filter(|p| p.group_id == Some(group_id)) {
            post.group_id = None;
        }
        true
    }
}

#[async_trait::async_trait]
impl BlogRepository for InMemoryRepository {
    async fn create_user(&self, username: &str) -> Result<User> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.username == username) {
            return Err(AppError::Validation(format!(
                "username '{}' is taken",
                username
            )));
        }

        let user = User {
            id: state.next_id(),
            username: username.to_string(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.state.read().await.user(user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_group(&self, group: NewGroup) -> Result<Group> {
        let mut state = self.state.write().await;
        if state.groups.iter().any(|g| g.slug == group.slug) {
            return Err(AppError::Validation(format!(
                "group slug '{}' is taken",
                group.slug
            )));
        }

        let group = Group {
            id: state.next_id(),
            title: group.title,
            slug: group.slug,
            description: group.description,
        };
        state.groups.push(group.clone());
        Ok(group)
    }

    async fn find_group(&self, group_id: i64) -> Result<Option<Group>> {
        Ok(self.state.read().await.group(group_id).cloned())
    }

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let state = self.state.read().await;
        Ok(state.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn count_posts(&self, scope: &FeedScope) -> Result<usize> {
        let state = self.state.read().await;
        Ok(state.posts.iter().filter(|p| state.in_scope(p, scope)).count())
    }

    async fn list_posts(
        &self,
        scope: &FeedScope,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<PostView>> {
        let state = self.state.read().await;
        Ok(state
            .feed(scope)
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|p| state.view(p))
            .collect())
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>> {
        let state = self.state.read().await;
        Ok(state.posts.iter().find(|p| p.id == post_id).cloned())
    }

    async fn find_post_view(&self, post_id: i64) -> Result<Option<PostView>> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .map(|p| state.view(p)))
    }

    async fn create_post(&self, author_id: i64, changes: PostChanges) -> Result<Post> {
        let mut state = self.state.write().await;
        state.check_user(author_id)?;
        state.check_group(changes.group_id)?;

        let post = Post {
            id: state.next_id(),
            author_id,
            group_id: changes.group_id,
            text: changes.text,
            image: changes.image,
            pub_date: Utc::now(),
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, post_id: i64, changes: PostChanges) -> Result<Option<Post>> {
        let mut state = self.state.write().await;
        state.check_group(changes.group_id)?;

        let Some(post) = state.posts.iter_mut().find(|p| p.id == post_id) else {
            return Ok(None);
        };
        post.text = changes.text;
        post.group_id = changes.group_id;
        post.image = changes.image;
        Ok(Some(post.clone()))
    }

    async fn create_comment(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment> {
        let mut state = self.state.write().await;
        state.check_user(author_id)?;
        if !state.posts.iter().any(|p| p.id == post_id) {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }

        let comment = Comment {
            id: state.next_id(),
            post_id,
            author_id,
            text: text.to_string(),
            created: Utc::now(),
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>> {
        let state = self.state.read().await;
        let mut comments: Vec<&Comment> = state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));

        Ok(comments
            .into_iter()
            .map(|c| CommentView {
                id: c.id,
                author: state
                    .user(c.author_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default(),
                text: c.text.clone(),
                created: c.created,
            })
            .collect())
    }

    async fn create_follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        state.check_user(user_id)?;
        state.check_user(author_id)?;
        if user_id == author_id {
            return Err(AppError::Validation("users cannot follow themselves".into()));
        }

        if state
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id)
        {
            return Ok(false);
        }

        let follow = Follow {
            id: state.next_id(),
            user_id,
            author_id,
        };
        state.follows.push(follow);
        Ok(true)
    }

    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.follows.len();
        state
            .follows
            .retain(|f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(state.follows.len() < before)
    }

    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn count_followers(&self, author_id: i64) -> Result<usize> {
        let state = self.state.read().await;
        let followers: HashSet<i64> = state
            .follows
            .iter()
            .filter(|f| f.author_id == author_id)
            .map(|f| f.user_id)
            .collect();
        Ok(followers.len())
    }
}
