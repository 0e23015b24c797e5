/// Post service - handles post creation, editing and the post detail page
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::db::BlogRepository;
use crate::error::{AppError, Result};
use crate::models::{CommentView, FeedScope, Post, PostChanges, PostForm, PostView};

/// Reject ids the gateway forwarded for users this service does not know.
pub(crate) async fn ensure_user(repo: &dyn BlogRepository, user_id: i64) -> Result<()> {
    match repo.find_user(user_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::Unauthorized(format!("unknown user {}", user_id))),
    }
}

/// Everything shown on a single post page.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: PostView,
    pub author_posts_count: usize,
    pub comments: Vec<CommentView>,
}

#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn BlogRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn BlogRepository>) -> Self {
        Self { repo }
    }

    /// Turn a submitted form into repository changes.
    ///
    /// The group, when given, must exist.
    async fn changes_from_form(&self, form: &PostForm) -> Result<PostChanges> {
        form.validate()?;

        if let Some(group_id) = form.group {
            if self.repo.find_group(group_id).await?.is_none() {
                return Err(AppError::Validation(format!(
                    "group: select a valid choice, {} is not one of the available choices",
                    group_id
                )));
            }
        }

        Ok(PostChanges {
            text: form.text.clone(),
            group_id: form.group,
            image: form.image_path(),
        })
    }

    /// Publish a new post written by `author_id`
    pub async fn create_post(&self, author_id: i64, form: &PostForm) -> Result<Post> {
        ensure_user(self.repo.as_ref(), author_id).await?;
        let changes = self.changes_from_form(form).await?;
        let post = self.repo.create_post(author_id, changes).await?;

        info!(post_id = post.id, author_id, "post created");
        Ok(post)
    }

    /// Edit a post. Only its author may do so; the publish date is kept.
    pub async fn edit_post(&self, post_id: i64, editor_id: i64, form: &PostForm) -> Result<Post> {
        let post = self
            .repo
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        if post.author_id != editor_id {
            warn!(post_id, editor_id, "edit rejected: not the author");
            return Err(AppError::Forbidden(
                "only the author can edit this post".to_string(),
            ));
        }

        let changes = self.changes_from_form(form).await?;
        let updated = self
            .repo
            .update_post(post_id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        info!(post_id, "post edited");
        Ok(updated)
    }

    pub async fn post_detail(&self, post_id: i64) -> Result<PostDetail> {
        let post = self
            .repo
            .find_post_view(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        let author_posts_count = self
            .repo
            .count_posts(&FeedScope::Profile(post.author.clone()))
            .await?;
        let comments = self.repo.list_comments(post_id).await?;

        Ok(PostDetail {
            post,
            author_posts_count,
            comments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryRepository;
    use crate::models::NewGroup;

    fn form(text: &str, group: Option<i64>) -> PostForm {
        PostForm {
            text: text.to_string(),
            group,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_edit_keeps_pub_date() {
        let repo = Arc::new(InMemoryRepository::new());
        let author = repo.create_user("auth").await.unwrap();
        let group = repo
            .create_group(NewGroup {
                title: "Тестовая группа".into(),
                slug: "test-slug".into(),
                description: "Тестовое описание".into(),
            })
            .await
            .unwrap();
        let service = PostService::new(repo.clone());

        let post = service
            .create_post(author.id, &form("Тестовый пост", Some(group.id)))
            .await
            .unwrap();
        let edited = service
            .edit_post(post.id, author.id, &form("Изменённый пост", None))
            .await
            .unwrap();

        assert_eq!(edited.text, "Изменённый пост");
        assert_eq!(edited.group_id, None);
        assert_eq!(edited.pub_date, post.pub_date);
    }

    #[tokio::test]
    async fn test_only_author_can_edit() {
        let repo = Arc::new(InMemoryRepository::new());
        let author = repo.create_user("auth").await.unwrap();
        let other = repo.create_user("other").await.unwrap();
        let service = PostService::new(repo.clone());

        let post = service
            .create_post(author.id, &form("Тестовый пост", None))
            .await
            .unwrap();
        let err = service
            .edit_post(post.id, other.id, &form("взлом", None))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
        let stored = repo.find_post(post.id).await.unwrap().unwrap();
        assert_eq!(stored.text, "Тестовый пост");
    }

    #[tokio::test]
    async fn test_unknown_group_and_blank_text_rejected() {
        let repo = Arc::new(InMemoryRepository::new());
        let author = repo.create_user("auth").await.unwrap();
        let service = PostService::new(repo.clone());

        let err = service
            .create_post(author.id, &form("текст", Some(999)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = service
            .create_post(author.id, &form("  ", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        assert_eq!(repo.count_posts(&FeedScope::Index).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_detail_counts_author_posts() {
        let repo = Arc::new(InMemoryRepository::new());
        let author = repo.create_user("auth").await.unwrap();
        let service = PostService::new(repo.clone());

        let first = service
            .create_post(author.id, &form("первый", None))
            .await
            .unwrap();
        service
            .create_post(author.id, &form("второй", None))
            .await
            .unwrap();
        repo.create_comment(first.id, author.id, "комментарий")
            .await
            .unwrap();

        let detail = service.post_detail(first.id).await.unwrap();
        assert_eq!(detail.author_posts_count, 2);
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.comments[0].author, "auth");

        let err = service.post_detail(12345).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
