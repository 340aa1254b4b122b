pub mod auth;
pub mod health;
pub mod todos;

use actix_web::web;

use crate::auth::{AuthMiddleware, JwtKeys};
use crate::error::json_error_handler;
use crate::middleware::RateLimiter;
use crate::services::{AuthService, TodosService};

/// JSON extractor settings shared by both services: body errors are 400s.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(json_error_handler)
}

/// Routes of the identity service. The login resource carries its own,
/// tighter limiter on top of the app-wide one.
pub fn user_service(
    auth_service: web::Data<AuthService>,
    login_limiter: RateLimiter,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(auth_service)
            .app_data(json_config())
            .service(health::user_health)
            .service(
                web::scope("/auth").service(auth::register).service(
                    web::resource("/login")
                        .wrap(login_limiter)
                        .route(web::post().to(auth::login)),
                ),
            );
    }
}

/// Routes of the todo service; everything under `/todos` requires a bearer token.
pub fn todo_service(
    todos_service: web::Data<TodosService>,
    keys: JwtKeys,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(todos_service)
            .app_data(json_config())
            .service(health::todo_health)
            .service(
                web::scope("/todos")
                    .wrap(AuthMiddleware::new(keys))
                    .service(todos::create_todo)
                    .service(todos::list_todos)
                    .service(todos::update_todo)
                    .service(todos::delete_todo),
            );
    }
}
