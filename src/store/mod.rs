//! Persistence seam for both services.
//!
//! Services only see these traits. `postgres` backs them with `sqlx`, and
//! `memory` keeps rows in-process for tests and local runs. Every method is a
//! single-row (or single-query) operation; no caller needs a transaction.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewUser, Task, TaskPatch, User};

pub use memory::{MemoryTaskStore, MemoryUserStore};
pub use postgres::{migrate_todos, migrate_users, PgTaskStore, PgUserStore};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. A duplicate email is `AppError::Conflict`.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn count(&self) -> Result<i64, AppError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, owner: Uuid, content: String) -> Result<Task, AppError>;
    async fn find_unique(&self, task_uuid: Uuid) -> Result<Option<Task>, AppError>;
    /// Every task owned by `owner`, in insertion order.
    async fn find_many(&self, owner: Uuid) -> Result<Vec<Task>, AppError>;
    /// Applies `patch` and refreshes `updated_at`. A missing row is `AppError::NotFound`.
    async fn update(&self, task_uuid: Uuid, patch: TaskPatch) -> Result<Task, AppError>;
    /// Removes the row and returns it. A missing row is `AppError::NotFound`.
    async fn delete(&self, task_uuid: Uuid) -> Result<Task, AppError>;
    async fn count(&self) -> Result<i64, AppError>;
}
