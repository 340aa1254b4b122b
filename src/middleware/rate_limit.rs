use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::config::RateLimitConfig;
use crate::error::AppError;

/// Entries are swept once the map grows past this many clients.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started: Instant,
}

/// Fixed-window request quota per client IP.
///
/// Clones share the same counters, so one limiter built before
/// `HttpServer::new` covers every worker.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Counts one request for `client`. Returns the seconds until the window
    /// resets when the quota is already spent.
    pub fn check(&self, client: &str, now: Instant) -> Result<(), u64> {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        if windows.len() >= PRUNE_THRESHOLD {
            let window = self.config.window;
            windows.retain(|_, entry| now.duration_since(entry.started) < window);
        }

        let entry = windows.entry(client.to_string()).or_insert(Window {
            count: 0,
            started: now,
        });

        let elapsed = now.duration_since(entry.started);
        if elapsed >= self.config.window {
            entry.count = 0;
            entry.started = now;
        }

        if entry.count < self.config.max_requests {
            entry.count += 1;
            Ok(())
        } else {
            let remaining = self.config.window.saturating_sub(now.duration_since(entry.started));
            Err(round_up_secs(remaining))
        }
    }
}

fn round_up_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    secs.max(1)
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimiterService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimiterService {
            service,
            limiter: self.clone(),
        }))
    }
}

pub struct RateLimiterService<S> {
    service: S,
    limiter: RateLimiter,
}

impl<S, B> Service<ServiceRequest> for RateLimiterService<S>
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
        let client = req
            .peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        match self.limiter.check(&client, Instant::now()) {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(retry_after_secs) => {
                log::warn!("rate limit exceeded for {} on {}", client, req.path());
                let response = req
                    .into_response(AppError::TooManyRequests { retry_after_secs }.error_response());
                Box::pin(async move { Ok(response.map_into_right_body()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};
    use std::net::SocketAddr;

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(window_secs),
        })
    }

    #[::core::prelude::v1::test]
    fn test_fixed_window_quota() {
        let limiter = limiter(2, 60);
        let start = Instant::now();

        assert_eq!(limiter.check("10.0.0.1", start), Ok(()));
        assert_eq!(limiter.check("10.0.0.1", start), Ok(()));
        assert_eq!(
            limiter.check("10.0.0.1", start + Duration::from_secs(10)),
            Err(50)
        );

        // Other clients have their own window.
        assert_eq!(limiter.check("10.0.0.2", start), Ok(()));

        // A new window restores the quota.
        assert_eq!(limiter.check("10.0.0.1", start + Duration::from_secs(60)), Ok(()));
    }

    #[::core::prelude::v1::test]
    fn test_round_up_secs() {
        assert_eq!(round_up_secs(Duration::from_millis(1500)), 2);
        assert_eq!(round_up_secs(Duration::from_secs(3)), 3);
        assert_eq!(round_up_secs(Duration::ZERO), 1);
    }

    #[actix_rt::test]
    async fn test_middleware_rejects_with_429() {
        let app = test::init_service(
            App::new()
                .wrap(limiter(1, 60))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;
        let peer: SocketAddr = "192.0.2.10:4000".parse().unwrap();

        let first = test::TestRequest::get().uri("/").peer_addr(peer).to_request();
        assert_eq!(test::call_service(&app, first).await.status(), StatusCode::OK);

        let second = test::TestRequest::get().uri("/").peer_addr(peer).to_request();
        let resp = test::call_service(&app, second).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(resp.headers().get("Retry-After").is_some());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Too many requests");
    }
}
