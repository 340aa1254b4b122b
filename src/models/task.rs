use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A row of the `tasks` table, owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Task {
    pub id: i64,
    pub uuid: Uuid,
    pub content: String,
    /// Public identifier of the owning user.
    pub user_uuid: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update applied to a task row. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub content: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateTodoRequest {
    #[validate(length(min = 2))]
    pub content: String,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateTodoRequest {
    #[validate(length(min = 2))]
    pub content: Option<String>,
}

impl From<UpdateTodoRequest> for TaskPatch {
    fn from(request: UpdateTodoRequest) -> Self {
        TaskPatch {
            content: request.content,
        }
    }
}

/// Public shape of a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub task_id: Uuid,
    pub content: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Task> for TodoResponse {
    fn from(task: &Task) -> Self {
        TodoResponse {
            task_id: task.uuid,
            content: task.content.clone(),
            user_id: task.user_uuid,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TodoListResponse {
    pub tasks: Vec<TodoResponse>,
    pub length: usize,
}
