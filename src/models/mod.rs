pub mod task;
pub mod user;

pub use task::{
    CreateTodoRequest, Task, TaskPatch, TodoListResponse, TodoResponse, UpdateTodoRequest,
};
pub use user::{NewUser, User};
