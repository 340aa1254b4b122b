use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::error::AppError;
use crate::services::{AuthService, TodosService};

/// Health check for the identity service, including the user count.
#[get("/health")]
pub async fn user_health(auth: web::Data<AuthService>) -> Result<HttpResponse, AppError> {
    let users = auth.users().count().await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "ok",
        "users": users,
        "timestamp": Utc::now()
    })))
}

/// Health check for the todo service, including the task count.
#[get("/health")]
pub async fn todo_health(todos: web::Data<TodosService>) -> Result<HttpResponse, AppError> {
    let tasks = todos.tasks().count().await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "ok",
        "tasks": tasks,
        "timestamp": Utc::now()
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryTaskStore, MemoryUserStore};
    use crate::auth::JwtKeys;
    use actix_web::test;
    use std::sync::Arc;
    use std::time::Duration;

    #[actix_web::test]
    async fn test_health_endpoints() {
        let auth = AuthService::new(
            Arc::new(MemoryUserStore::new()),
            JwtKeys::new("health_test_secret_value", Duration::from_secs(60)),
        );
        auth.register("h@example.com", "password123").await.unwrap();

        let app = test::init_service(
            actix_web::App::new()
                .app_data(web::Data::new(auth))
                .service(user_health),
        )
        .await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let json: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["users"], 1);
        assert!(json["timestamp"].is_string());

        let app = test::init_service(
            actix_web::App::new()
                .app_data(web::Data::new(TodosService::new(Arc::new(MemoryTaskStore::new()))))
                .service(todo_health),
        )
        .await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let json: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["tasks"], 0);
    }
}
