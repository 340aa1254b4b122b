use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::extractors::AuthenticatedUser;
use crate::auth::token::{JwtKeys, TOKEN_REJECTED};
use crate::error::AppError;

/// Token from an `Authorization: Bearer <token>` header. The scheme is
/// matched case-insensitively.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Bearer-token guard for every route of the scope it wraps.
///
/// On success the verified identity is stored in the request extensions as
/// an `AuthenticatedUser`; any failure short-circuits with a 401 response
/// rendered from `AppError`, so outer middleware still sees a normal response.
#[derive(Clone)]
pub struct AuthMiddleware {
    keys: Rc<JwtKeys>,
}

impl AuthMiddleware {
    pub fn new(keys: JwtKeys) -> Self {
        Self { keys: Rc::new(keys) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            keys: Rc::clone(&self.keys),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    keys: Rc<JwtKeys>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token);

        let verified = match token {
            Some(token) => self.keys.verify(token),
            None => Err(AppError::Unauthorized(TOKEN_REJECTED.into())),
        };

        match verified {
            Ok(claims) => {
                req.extensions_mut().insert(AuthenticatedUser {
                    user_id: claims.sub,
                    email: claims.email,
                });
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(app_err) => {
                log::warn!("{} {} rejected: {}", req.method(), req.path(), app_err);
                let response = req.into_response(app_err.error_response());
                Box::pin(async move { Ok(response.map_into_right_body()) })
            }
        }
    }
}
