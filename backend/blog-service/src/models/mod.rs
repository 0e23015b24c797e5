/// Data models for blog-service
///
/// This module defines structures for:
/// - User: authors and readers, provisioned by the auth gateway
/// - Group: communities a post may be tagged to
/// - Post: a text entry with optional group and image
/// - Comment: a reply on a post
/// - Follow: a directed reader -> author subscription
/// - FeedScope: the filter applied to a feed query
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Characters of post text used when a post is displayed in one line.
pub const POST_PREVIEW_CHARS: usize = 15;

/// Media directory for post images.
pub const POST_IMAGE_DIR: &str = "posts/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// Stored post row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub group_id: Option<i64>,
    pub text: String,
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
}

impl std::fmt::Display for Post {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&preview(&self.text))
    }
}

/// First characters of a post body, cut on a char boundary.
pub fn preview(text: &str) -> String {
    text.chars().take(POST_PREVIEW_CHARS).collect()
}

/// Group reference embedded in a post view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub slug: String,
    pub title: String,
}

/// A post as shown in feeds: author and group resolved to display values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostView {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: String,
    pub group: Option<GroupRef>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created: DateTime<Utc>,
}

/// A comment as shown under a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentView {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub id: i64,
    pub user_id: i64,
    pub author_id: i64,
}

/// Which posts a feed contains.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedScope {
    /// Every post on the site
    Index,
    /// Posts tagged to the group with this slug
    Group(String),
    /// Posts written by the user with this username
    Profile(String),
    /// Posts written by authors the given user follows
    Following(i64),
}

impl FeedScope {
    /// Metrics label
    pub fn label(&self) -> &'static str {
        match self {
            FeedScope::Index => "index",
            FeedScope::Group(_) => "group",
            FeedScope::Profile(_) => "profile",
            FeedScope::Following(_) => "follow",
        }
    }
}

/// Post create/edit form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PostForm {
    #[validate(custom(function = "not_blank"))]
    pub text: String,
    #[serde(default)]
    pub group: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
}

impl PostForm {
    /// Image path as stored, under the post media directory.
    pub fn image_path(&self) -> Option<String> {
        self.image
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                if name.starts_with(POST_IMAGE_DIR) {
                    name.to_string()
                } else {
                    format!("{}{}", POST_IMAGE_DIR, name.trim_start_matches('/'))
                }
            })
    }
}

/// Validated post fields handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CommentForm {
    #[validate(custom(function = "not_blank"))]
    pub text: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_display_is_text_preview() {
        let post = Post {
            id: 1,
            author_id: 1,
            group_id: None,
            text: "Тестовый пост, который длиннее пятнадцати символов".to_string(),
            image: None,
            pub_date: Utc::now(),
        };
        assert_eq!(post.to_string(), "Тестовый пост, ");
        assert_eq!(post.to_string().chars().count(), POST_PREVIEW_CHARS);
    }

    #[test]
    fn test_group_display_is_title() {
        let group = Group {
            id: 1,
            title: "Тестовая группа".to_string(),
            slug: "test-slug".to_string(),
            description: "Тестовое описание".to_string(),
        };
        assert_eq!(group.to_string(), "Тестовая группа");
    }

    #[test]
    fn test_blank_text_is_rejected() {
        let form = PostForm {
            text: "   ".to_string(),
            ..Default::default()
        };
        assert!(form.validate().is_err());

        let comment = CommentForm {
            text: "hola".to_string(),
        };
        assert!(comment.validate().is_ok());
    }

    #[test]
    fn test_image_path_is_under_media_dir() {
        let mut form = PostForm {
            text: "text".to_string(),
            image: Some("small.gif".to_string()),
            ..Default::default()
        };
        assert_eq!(form.image_path().as_deref(), Some("posts/small.gif"));

        form.image = Some("posts/small.gif".to_string());
        assert_eq!(form.image_path().as_deref(), Some("posts/small.gif"));

        form.image = Some("  ".to_string());
        assert_eq!(form.image_path(), None);
    }
}
