use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{NewUser, Task, TaskPatch, User};
use crate::services::auth::EMAIL_IN_USE;

const USER_COLUMNS: &str = "id, uuid, email, password_hash, created_at, updated_at";
const TASK_COLUMNS: &str = "id, uuid, content, user_uuid, created_at, updated_at";

/// Applies the identity service schema (`migrations/users`).
pub async fn migrate_users(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations/users").run(pool).await
}

/// Applies the todo service schema (`migrations/todos`).
pub async fn migrate_todos(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations/todos").run(pool).await
}

/// The only unique column a user insert can violate is `email`.
fn email_conflict(error: AppError) -> AppError {
    match error {
        AppError::Conflict(_) => AppError::Conflict(EMAIL_IN_USE.into()),
        other => other,
    }
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        // A concurrent registration that slipped past the service check
        // fails on the unique index and surfaces as Conflict.
        let sql = format!(
            "INSERT INTO users (uuid, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| email_conflict(e.into()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn create(&self, owner: Uuid, content: String) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks (uuid, content, user_uuid) VALUES ($1, $2, $3) RETURNING {}",
            TASK_COLUMNS
        );
        let row = sqlx::query_as::<_, Task>(&sql)
            .bind(Uuid::new_v4())
            .bind(content)
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_unique(&self, task_uuid: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!("SELECT {} FROM tasks WHERE uuid = $1", TASK_COLUMNS);
        let row = sqlx::query_as::<_, Task>(&sql)
            .bind(task_uuid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_many(&self, owner: Uuid) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE user_uuid = $1 ORDER BY id",
            TASK_COLUMNS
        );
        let rows = sqlx::query_as::<_, Task>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn update(&self, task_uuid: Uuid, patch: TaskPatch) -> Result<Task, AppError> {
        let sql = format!(
            "UPDATE tasks SET content = COALESCE($2, content), updated_at = NOW() \
             WHERE uuid = $1 RETURNING {}",
            TASK_COLUMNS
        );
        // fetch_one maps a vanished row to RowNotFound, i.e. AppError::NotFound.
        let row = sqlx::query_as::<_, Task>(&sql)
            .bind(task_uuid)
            .bind(patch.content)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, task_uuid: Uuid) -> Result<Task, AppError> {
        let sql = format!("DELETE FROM tasks WHERE uuid = $1 RETURNING {}", TASK_COLUMNS);
        let row = sqlx::query_as::<_, Task>(&sql)
            .bind(task_uuid)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM tasks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
