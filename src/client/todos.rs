use uuid::Uuid;

use super::{ApiClient, ClientError, SessionStore};
use crate::models::{CreateTodoRequest, TodoListResponse, TodoResponse, UpdateTodoRequest};

/// In-memory mirror of the caller's todo list.
///
/// The server row returned by each mutation is authoritative; the local list
/// is only patched after the request succeeds.
#[derive(Debug)]
pub struct TodosStore {
    pub items: Vec<TodoResponse>,
    pub loading: bool,
    pub error: Option<String>,
    todos_api: ApiClient,
}

impl TodosStore {
    pub fn new(todos_api: ApiClient) -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            todos_api,
        }
    }

    /// Replaces the local list with the server's. Failures are recorded in
    /// `error` rather than returned.
    pub async fn fetch(&mut self, session: &SessionStore) {
        self.loading = true;
        self.error = None;

        match self
            .todos_api
            .get::<TodoListResponse>("/todos", session.token())
            .await
        {
            Ok(list) => self.items = list.tasks,
            Err(e) => {
                log::warn!("failed to fetch todos: {}", e);
                self.error = Some(e.to_string());
            }
        }

        self.loading = false;
    }

    pub async fn add(
        &mut self,
        session: &SessionStore,
        content: &str,
    ) -> Result<TodoResponse, ClientError> {
        let body = CreateTodoRequest {
            content: content.to_string(),
        };
        let task: TodoResponse = self
            .todos_api
            .post("/todos", &body, session.token())
            .await?;
        self.items.push(task.clone());
        Ok(task)
    }

    pub async fn update(
        &mut self,
        session: &SessionStore,
        task_id: Uuid,
        content: &str,
    ) -> Result<TodoResponse, ClientError> {
        let body = UpdateTodoRequest {
            content: Some(content.to_string()),
        };
        let task: TodoResponse = self
            .todos_api
            .put(&format!("/todos/{}", task_id), &body, session.token())
            .await?;
        if let Some(item) = self.items.iter_mut().find(|item| item.task_id == task_id) {
            *item = task.clone();
        }
        Ok(task)
    }

    pub async fn remove(&mut self, session: &SessionStore, task_id: Uuid) -> Result<(), ClientError> {
        self.todos_api
            .delete(&format!("/todos/{}", task_id), session.token())
            .await?;
        self.items.retain(|item| item.task_id != task_id);
        Ok(())
    }
}
