/// HTTP handlers for blog-service
///
/// This module contains handlers for:
/// - Feeds: the index, group pages, profiles and the follow feed
/// - Posts: detail, create and edit
/// - Comments and follows
/// - Admin: index cache invalidation
/// - Health: liveness and readiness probes
pub mod admin;
pub mod comments;
pub mod feed;
pub mod follow;
pub mod health;
pub mod posts;

pub use admin::clear_cache;
pub use comments::add_comment;
pub use feed::{follow_index, group_posts, index, profile};
pub use follow::{profile_follow, profile_unfollow};
pub use health::{health_summary, liveness_check, readiness_summary, HealthState};
pub use posts::{create_post, edit_post, post_detail};

use actix_web::web;
use std::sync::Arc;

use crate::cache::IndexPageCache;
use crate::db::BlogRepository;
use crate::pagination::Paginator;
use crate::services::FeedService;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn BlogRepository>,
    pub feeds: FeedService,
    pub index_cache: IndexPageCache,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn BlogRepository>,
        index_cache: IndexPageCache,
        paginator: Paginator,
    ) -> Self {
        Self {
            feeds: FeedService::new(repo.clone(), paginator),
            repo,
            index_cache,
        }
    }
}

/// Blog routes. Health and metrics endpoints are mounted by the binary.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/follow/", web::get().to(follow_index))
        .route("/create/", web::post().to(create_post))
        .route("/group/{slug}/", web::get().to(group_posts))
        .service(
            web::scope("/profile/{username}")
                .route("/", web::get().to(profile))
                .route("/follow/", web::post().to(profile_follow))
                .route("/unfollow/", web::post().to(profile_unfollow)),
        )
        .service(
            web::scope("/posts/{post_id}")
                .route("/", web::get().to(post_detail))
                .route("/edit/", web::post().to(edit_post))
                .route("/comment/", web::post().to(add_comment)),
        )
        .route("/admin/cache/clear", web::post().to(clear_cache));
}
