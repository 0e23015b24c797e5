use actix_web::{web, HttpResponse};
use serde::Serialize;

use super::AppState;
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::services::FollowService;

#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub author: String,
    /// Whether the current user follows the author after the request
    pub following: bool,
    /// Whether the request changed anything
    pub changed: bool,
}

pub async fn profile_follow(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let username = username.into_inner();
    let service = FollowService::new(state.repo.clone());

    let changed = service.follow(user.0, &username).await?;
    let following = service.profile(&username, Some(user.0)).await?.following;

    Ok(HttpResponse::Ok().json(FollowResponse {
        author: username,
        following,
        changed,
    }))
}

pub async fn profile_unfollow(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let username = username.into_inner();
    let changed = FollowService::new(state.repo.clone())
        .unfollow(user.0, &username)
        .await?;

    Ok(HttpResponse::Ok().json(FollowResponse {
        author: username,
        following: false,
        changed,
    }))
}
