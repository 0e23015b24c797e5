/// Comment service - replies on posts
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::db::BlogRepository;
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentForm};
use crate::services::posts::ensure_user;

#[derive(Clone)]
pub struct CommentService {
    repo: Arc<dyn BlogRepository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn BlogRepository>) -> Self {
        Self { repo }
    }

    pub async fn add_comment(
        &self,
        post_id: i64,
        author_id: i64,
        form: &CommentForm,
    ) -> Result<Comment> {
        form.validate()?;
        ensure_user(self.repo.as_ref(), author_id).await?;

        if self.repo.find_post(post_id).await?.is_none() {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }

        let comment = self
            .repo
            .create_comment(post_id, author_id, &form.text)
            .await?;
        info!(comment_id = comment.id, post_id, author_id, "comment added");
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryRepository;
    use crate::models::PostChanges;

    #[tokio::test]
    async fn test_comment_attached_to_post() {
        let repo = Arc::new(InMemoryRepository::new());
        let author = repo.create_user("auth").await.unwrap();
        let reader = repo.create_user("reader").await.unwrap();
        let post = repo
            .create_post(
                author.id,
                PostChanges {
                    text: "Тестовый пост".into(),
                    group_id: None,
                    image: None,
                },
            )
            .await
            .unwrap();
        let service = CommentService::new(repo.clone());

        let form = CommentForm {
            text: "Тестовый комментарий".into(),
        };
        let comment = service.add_comment(post.id, reader.id, &form).await.unwrap();
        assert_eq!(comment.post_id, post.id);

        let comments = repo.list_comments(post.id).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].author, "reader");
    }

    #[tokio::test]
    async fn test_comment_on_missing_post() {
        let repo = Arc::new(InMemoryRepository::new());
        let reader = repo.create_user("reader").await.unwrap();
        let service = CommentService::new(repo);

        let form = CommentForm { text: "текст".into() };
        let err = service.add_comment(77, reader.id, &form).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
