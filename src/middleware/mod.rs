pub mod rate_limit;

use actix_cors::Cors;
use actix_web::{http::header, middleware::DefaultHeaders};

pub use rate_limit::RateLimiter;

/// CORS policy restricted to `allowed_origins`.
///
/// Requests without an `Origin` header (curl, server-to-server, tests) are
/// not CORS requests and pass untouched. Tokens travel in a header, so
/// credentials are never allowed.
pub fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(3600)
}

/// Baseline hardening headers added to every response.
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-Frame-Options", "DENY"))
        .add(("Referrer-Policy", "no-referrer"))
        .add(("Cross-Origin-Resource-Policy", "cross-origin"))
        .add(("X-DNS-Prefetch-Control", "off"))
}
