use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{CreateTodoRequest, UpdateTodoRequest},
    response::ApiResponse,
    services::{todos::TASK_NOT_FOUND, TodosService},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// An identifier that is not a UUID can never name a stored task.
fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(TASK_NOT_FOUND.into()))
}

/// Creates a todo owned by the caller.
///
/// ## Responses:
/// - `201 Created`: the mapped task.
/// - `400 Bad Request`: missing `content`, shorter than 2 characters, or unknown fields.
/// - `401 Unauthorized`: missing or invalid bearer token.
#[post("")]
pub async fn create_todo(
    todos: web::Data<TodosService>,
    user: AuthenticatedUser,
    todo_data: web::Json<CreateTodoRequest>,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;

    let task = todos
        .create(user.user_id, todo_data.into_inner().content)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(task, "Todo task created successfully")))
}

/// Lists every todo owned by the caller as `{tasks, length}`.
#[get("")]
pub async fn list_todos(
    todos: web::Data<TodosService>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let list = todos.list_all(user.user_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(list, "Todo tasks retrieved successfully")))
}

/// Updates the content of an owned todo.
///
/// ## Responses:
/// - `200 OK`: the full mapped task after the update.
/// - `400 Bad Request`: invalid patch.
/// - `403 Forbidden`: the task belongs to another user.
/// - `404 Not Found`: no task with this id (checked before ownership).
#[put("/{task_id}")]
pub async fn update_todo(
    todos: web::Data<TodosService>,
    user: AuthenticatedUser,
    task_id: web::Path<String>,
    todo_data: web::Json<UpdateTodoRequest>,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;
    let task_uuid = parse_task_id(&task_id)?;

    let task = todos
        .update(user.user_id, task_uuid, todo_data.into_inner().into())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(task, "Todo task updated successfully")))
}

/// Deletes an owned todo. `204` on success, `404` / `403` as for updates.
#[delete("/{task_id}")]
pub async fn delete_todo(
    todos: web::Data<TodosService>,
    user: AuthenticatedUser,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let task_uuid = parse_task_id(&task_id)?;

    let message = todos.delete(user.user_id, task_uuid).await?;
    log::info!("{}: {}", task_uuid, message);

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_task_id(&id.to_string()).unwrap(), id);

        match parse_task_id("not-a-uuid") {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, TASK_NOT_FOUND),
            other => panic!("expected not found, got {:?}", other),
        }
    }
}
