use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::auth::token::TOKEN_REJECTED;
use crate::error::AppError;

/// The caller identity injected by `AuthMiddleware` after a token verifies.
///
/// Handlers behind the guard take this as an argument. If the guard did not
/// run for the route, extraction fails with `AppError::Unauthorized`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Public identifier of the user (the token subject).
    pub user_id: Uuid,
    pub email: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().cloned() {
            Some(user) => ready(Ok(user)),
            None => {
                let err = AppError::Unauthorized(TOKEN_REJECTED.to_string());
                ready(Err(err.into()))
            }
        }
    }
}
