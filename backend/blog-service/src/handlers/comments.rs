use actix_web::{web, HttpResponse};

use super::AppState;
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::models::CommentForm;
use crate::services::CommentService;

pub async fn add_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    post_id: web::Path<i64>,
    form: web::Json<CommentForm>,
) -> Result<HttpResponse> {
    let service = CommentService::new(state.repo.clone());
    let comment = service
        .add_comment(post_id.into_inner(), user.0, &form)
        .await?;
    Ok(HttpResponse::Created().json(comment))
}
