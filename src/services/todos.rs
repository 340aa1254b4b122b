use std::sync::Arc;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Task, TaskPatch, TodoListResponse, TodoResponse};
use crate::store::TaskStore;

pub const TASK_NOT_FOUND: &str = "Your todo task not found";
pub const TASK_FORBIDDEN: &str = "Forbidden resource";
pub const TASK_DELETED: &str = "Todo task deleted successfully";

/// Per-user todo CRUD with row ownership enforcement.
#[derive(Clone)]
pub struct TodosService {
    tasks: Arc<dyn TaskStore>,
}

impl TodosService {
    pub fn new(tasks: Arc<dyn TaskStore>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &dyn TaskStore {
        self.tasks.as_ref()
    }

    pub async fn create(&self, user_uuid: Uuid, content: String) -> Result<TodoResponse, AppError> {
        let task = self.tasks.create(user_uuid, content).await?;
        Ok(TodoResponse::from(&task))
    }

    pub async fn list_all(&self, user_uuid: Uuid) -> Result<TodoListResponse, AppError> {
        let tasks: Vec<TodoResponse> = self
            .tasks
            .find_many(user_uuid)
            .await?
            .iter()
            .map(TodoResponse::from)
            .collect();

        Ok(TodoListResponse {
            length: tasks.len(),
            tasks,
        })
    }

    pub async fn update(
        &self,
        user_uuid: Uuid,
        task_uuid: Uuid,
        patch: TaskPatch,
    ) -> Result<TodoResponse, AppError> {
        self.owned_task(user_uuid, task_uuid).await?;
        let task = self.tasks.update(task_uuid, patch).await?;
        Ok(TodoResponse::from(&task))
    }

    /// Removes an owned task and returns the confirmation message.
    pub async fn delete(&self, user_uuid: Uuid, task_uuid: Uuid) -> Result<&'static str, AppError> {
        self.owned_task(user_uuid, task_uuid).await?;
        self.tasks.delete(task_uuid).await?;
        Ok(TASK_DELETED)
    }

    /// Not-found is checked before ownership, and both before any mutation.
    async fn owned_task(&self, user_uuid: Uuid, task_uuid: Uuid) -> Result<Task, AppError> {
        let task = self
            .tasks
            .find_unique(task_uuid)
            .await?
            .ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.into()))?;

        if task.user_uuid != user_uuid {
            log::warn!("user {} denied access to task {}", user_uuid, task_uuid);
            return Err(AppError::Forbidden(TASK_FORBIDDEN.into()));
        }
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTaskStore;
    use pretty_assertions::assert_eq;

    fn service() -> TodosService {
        TodosService::new(Arc::new(MemoryTaskStore::new()))
    }

    fn patch(content: &str) -> TaskPatch {
        TaskPatch {
            content: Some(content.to_string()),
        }
    }

    #[actix_rt::test]
    async fn test_round_trip() {
        let todos = service();
        let owner = Uuid::new_v4();

        let created = todos.create(owner, "buy milk".into()).await.unwrap();
        assert_eq!(created.user_id, owner);

        let listed = todos.list_all(owner).await.unwrap();
        assert_eq!(listed.length, 1);
        assert_eq!(listed.tasks, vec![created.clone()]);

        let updated = todos
            .update(owner, created.task_id, patch("buy milk and eggs"))
            .await
            .unwrap();
        assert_eq!(updated.task_id, created.task_id);
        assert_eq!(updated.content, "buy milk and eggs");
        assert_eq!(todos.list_all(owner).await.unwrap().tasks, vec![updated]);

        assert_eq!(todos.delete(owner, created.task_id).await.unwrap(), TASK_DELETED);
        assert_eq!(todos.list_all(owner).await.unwrap().length, 0);
    }

    #[actix_rt::test]
    async fn test_ownership_is_enforced() {
        let todos = service();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let task = todos.create(alice, "alice's task".into()).await.unwrap();

        assert!(matches!(
            todos.update(bob, task.task_id, patch("hijacked")).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            todos.delete(bob, task.task_id).await,
            Err(AppError::Forbidden(_))
        ));

        let stored = todos.tasks().find_unique(task.task_id).await.unwrap().unwrap();
        assert_eq!(stored.content, "alice's task");
    }

    #[actix_rt::test]
    async fn test_not_found_precedes_ownership() {
        let todos = service();
        let missing = Uuid::new_v4();

        for caller in [Uuid::new_v4(), Uuid::new_v4()] {
            match todos.update(caller, missing, patch("anything")).await {
                Err(AppError::NotFound(msg)) => assert_eq!(msg, TASK_NOT_FOUND),
                other => panic!("expected not found, got {:?}", other),
            }
            assert!(matches!(
                todos.delete(caller, missing).await,
                Err(AppError::NotFound(_))
            ));
        }
    }

    #[actix_rt::test]
    async fn test_lists_are_isolated() {
        let todos = service();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        for i in 0..4 {
            let owner = if i % 2 == 0 { alice } else { bob };
            todos.create(owner, format!("task {}", i)).await.unwrap();
        }

        let alice_tasks = todos.list_all(alice).await.unwrap();
        assert_eq!(alice_tasks.length, 2);
        assert!(alice_tasks.tasks.iter().all(|task| task.user_id == alice));

        let nobody = todos.list_all(Uuid::new_v4()).await.unwrap();
        assert_eq!(nobody, TodoListResponse { tasks: vec![], length: 0 });
    }
}
