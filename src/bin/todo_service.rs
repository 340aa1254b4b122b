use std::io;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use todo_services::auth::JwtKeys;
use todo_services::config::Config;
use todo_services::middleware::{cors, security_headers, RateLimiter};
use todo_services::routes;
use todo_services::services::TodosService;
use todo_services::store::{migrate_todos, PgTaskStore};

fn startup_error(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::todo_service_from_env().map_err(startup_error)?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(startup_error)?;
    migrate_todos(&pool).await.map_err(startup_error)?;

    let todos_service = web::Data::new(TodosService::new(Arc::new(PgTaskStore::new(pool))));
    let keys = JwtKeys::new(&config.jwt_secret, config.jwt_expires_in);
    let global_limiter = RateLimiter::new(config.rate_limit);
    let allowed_origins = config.allowed_origins.clone();

    log::info!("Starting todo service at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .wrap(global_limiter.clone())
            .wrap(security_headers())
            .wrap(cors(&allowed_origins))
            .wrap(Logger::default())
            .configure(routes::todo_service(todos_service.clone(), keys.clone()))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
