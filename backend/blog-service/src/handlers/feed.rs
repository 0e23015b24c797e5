use actix_web::{dev::Payload, web, FromRequest, HttpRequest, HttpResponse};
use serde::Serialize;
use std::future::{ready, Ready};

use super::AppState;
use crate::cache::IndexPageCache;
use crate::error::{AppError, Result};
use crate::middleware::{AuthenticatedUser, OptionalUser};
use crate::models::{FeedScope, Group, PostView};
use crate::pagination::Page;
use crate::services::{FollowService, ProfileSummary};

/// `?page=` is kept raw; parsing falls back instead of rejecting.
///
/// A repeated `page` keeps its last value. Other parameters are ignored.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn from_query_string(query: &str) -> Self {
        let page = web::Query::<Vec<(String, String)>>::from_query(query)
            .map(|pairs| pairs.into_inner())
            .unwrap_or_default()
            .into_iter()
            .filter(|(name, _)| name == "page")
            .map(|(_, value)| value)
            .last();

        Self { page }
    }
}

impl FromRequest for PageQuery {
    type Error = AppError;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(PageQuery::from_query_string(req.query_string())))
    }
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub page: Page<PostView>,
}

#[derive(Debug, Serialize)]
pub struct GroupFeedResponse {
    pub group: Group,
    pub page: Page<PostView>,
}

#[derive(Debug, Serialize)]
pub struct ProfileFeedResponse {
    pub author: ProfileSummary,
    pub page: Page<PostView>,
}

fn json_body(body: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .body(body)
}

/// Site-wide feed. The first page is served from the index cache.
pub async fn index(state: web::Data<AppState>, query: PageQuery) -> Result<HttpResponse> {
    let scope = FeedScope::Index;
    let page_param = query.page.as_deref();
    let cache_key = IndexPageCache::key_for(&scope, page_param);

    if let Some(key) = cache_key {
        if let Some(body) = state.index_cache.get(key).await? {
            return Ok(json_body(body));
        }
    }

    let page = state.feeds.resolve_page(&scope, page_param).await?;
    let body = serde_json::to_vec(&FeedResponse { page })?;

    if let Some(key) = cache_key {
        state.index_cache.store(key, &body).await?;
    }

    Ok(json_body(body))
}

pub async fn group_posts(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    query: PageQuery,
) -> Result<HttpResponse> {
    let slug = slug.into_inner();
    let group = state
        .repo
        .find_group_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("group {}", slug)))?;

    let page = state
        .feeds
        .resolve_page(&FeedScope::Group(slug), query.page.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(GroupFeedResponse { group, page }))
}

pub async fn profile(
    state: web::Data<AppState>,
    username: web::Path<String>,
    viewer: OptionalUser,
    query: PageQuery,
) -> Result<HttpResponse> {
    let username = username.into_inner();
    let author = FollowService::new(state.repo.clone())
        .profile(&username, viewer.0)
        .await?;

    let page = state
        .feeds
        .resolve_page(&FeedScope::Profile(username), query.page.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(ProfileFeedResponse { author, page }))
}

/// Posts by the authors the current user follows. Never cached.
pub async fn follow_index(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: PageQuery,
) -> Result<HttpResponse> {
    let page = state
        .feeds
        .resolve_page(&FeedScope::Following(user.0), query.page.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(FeedResponse { page }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page_value_wins() {
        assert_eq!(PageQuery::from_query_string("page=1&page=2").page.as_deref(), Some("2"));
        assert_eq!(PageQuery::from_query_string("page=2&page=x").page.as_deref(), Some("x"));
        assert_eq!(PageQuery::from_query_string("sort=new&page=3").page.as_deref(), Some("3"));
        assert_eq!(PageQuery::from_query_string("").page, None);
    }
}
