#![doc = "The `todo_services` library crate."]
#![doc = ""]
#![doc = "Shared code for the two services (`user-service` issues tokens, `todo-service`"]
#![doc = "serves per-user todos behind the token guard) plus the client-side session and"]
#![doc = "todos stores used by the web front-end."]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod store;

pub use crate::error::AppError;
pub use crate::response::ApiResponse;
