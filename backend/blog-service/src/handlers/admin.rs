use actix_web::{web, HttpResponse};
use tracing::info;

use super::AppState;
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::services::posts::ensure_user;

/// Drop every cached index render. Safe to repeat.
///
/// Guests are refused; the gateway limits the route to staff accounts.
pub async fn clear_cache(state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse> {
    ensure_user(state.repo.as_ref(), user.0).await?;
    state.index_cache.invalidate().await?;

    info!(user_id = user.0, "index cache cleared");
    Ok(HttpResponse::NoContent().finish())
}
