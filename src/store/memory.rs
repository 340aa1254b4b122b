use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{NewUser, Task, TaskPatch, User};
use crate::services::auth::EMAIL_IN_USE;

struct Table<T> {
    rows: Vec<T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn lock<T>(table: &Mutex<Table<T>>) -> Result<MutexGuard<'_, Table<T>>, AppError> {
    table
        .lock()
        .map_err(|_| AppError::InternalServerError("in-memory store lock poisoned".into()))
}

/// In-process `users` table.
#[derive(Default)]
pub struct MemoryUserStore {
    table: Mutex<Table<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut table = lock(&self.table)?;
        if table.rows.iter().any(|row| row.email == user.email) {
            return Err(AppError::Conflict(EMAIL_IN_USE.into()));
        }

        let now = Utc::now();
        let row = User {
            id: table.allocate_id(),
            uuid: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        table.rows.push(row.clone());
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let table = lock(&self.table)?;
        Ok(table.rows.iter().find(|row| row.email == email).cloned())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(lock(&self.table)?.rows.len() as i64)
    }
}

/// In-process `tasks` table.
#[derive(Default)]
pub struct MemoryTaskStore {
    table: Mutex<Table<Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn create(&self, owner: Uuid, content: String) -> Result<Task, AppError> {
        let mut table = lock(&self.table)?;
        let now = Utc::now();
        let row = Task {
            id: table.allocate_id(),
            uuid: Uuid::new_v4(),
            content,
            user_uuid: owner,
            created_at: now,
            updated_at: now,
        };
        table.rows.push(row.clone());
        Ok(row)
    }

    async fn find_unique(&self, task_uuid: Uuid) -> Result<Option<Task>, AppError> {
        let table = lock(&self.table)?;
        Ok(table.rows.iter().find(|row| row.uuid == task_uuid).cloned())
    }

    async fn find_many(&self, owner: Uuid) -> Result<Vec<Task>, AppError> {
        let table = lock(&self.table)?;
        Ok(table
            .rows
            .iter()
            .filter(|row| row.user_uuid == owner)
            .cloned()
            .collect())
    }

    async fn update(&self, task_uuid: Uuid, patch: TaskPatch) -> Result<Task, AppError> {
        let mut table = lock(&self.table)?;
        let row = table
            .rows
            .iter_mut()
            .find(|row| row.uuid == task_uuid)
            .ok_or_else(|| AppError::NotFound("Record not found".into()))?;

        if let Some(content) = patch.content {
            row.content = content;
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, task_uuid: Uuid) -> Result<Task, AppError> {
        let mut table = lock(&self.table)?;
        let idx = table
            .rows
            .iter()
            .position(|row| row.uuid == task_uuid)
            .ok_or_else(|| AppError::NotFound("Record not found".into()))?;
        Ok(table.rows.remove(idx))
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(lock(&self.table)?.rows.len() as i64)
    }
}
