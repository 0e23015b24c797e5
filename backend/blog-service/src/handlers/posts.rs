/// Post handlers - detail, create and edit
use actix_web::{web, HttpResponse};

use super::AppState;
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::models::PostForm;
use crate::services::PostService;

pub async fn post_detail(state: web::Data<AppState>, post_id: web::Path<i64>) -> Result<HttpResponse> {
    let service = PostService::new(state.repo.clone());
    let detail = service.post_detail(post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Create a post authored by the current user
pub async fn create_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    form: web::Json<PostForm>,
) -> Result<HttpResponse> {
    let service = PostService::new(state.repo.clone());
    let post = service.create_post(user.0, &form).await?;
    Ok(HttpResponse::Created().json(post))
}

pub async fn edit_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    post_id: web::Path<i64>,
    form: web::Json<PostForm>,
) -> Result<HttpResponse> {
    let service = PostService::new(state.repo.clone());
    let post = service.edit_post(post_id.into_inner(), user.0, &form).await?;
    Ok(HttpResponse::Ok().json(post))
}
