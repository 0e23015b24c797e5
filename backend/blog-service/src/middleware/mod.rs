/// Request identity for blog-service
///
/// The auth gateway in front of the service authenticates the session and
/// forwards the user's id in the `X-User-Id` header. Handlers that need a
/// signed-in user take `AuthenticatedUser`; handlers open to guests take
/// `OptionalUser`.
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "X-User-Id";

/// Id of the signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub i64);

/// Id of the signed-in user, or `None` for guests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalUser(pub Option<i64>);

fn user_id_from(req: &HttpRequest) -> Option<i64> {
    req.headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            user_id_from(req)
                .map(AuthenticatedUser)
                .ok_or_else(|| AppError::Unauthorized("login required".to_string())),
        )
    }
}

impl FromRequest for OptionalUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(OptionalUser(user_id_from(req))))
    }
}
