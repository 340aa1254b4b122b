//! Client-side state for the web front-end.
//!
//! `ApiClient` talks to either service and unwraps the response envelope,
//! `SessionStore` owns the bearer token and its durable copy, `router`
//! guards navigation on the session, and `TodosStore` mirrors the caller's
//! todo list from the todo service.

pub mod api;
pub mod router;
pub mod session;
pub mod storage;
pub mod todos;

pub use api::ApiClient;
pub use router::{before_each, Navigation, Route};
pub use session::{SessionStore, SessionUser, TOKEN_KEY};
pub use storage::{FileStorage, MemoryStorage, TokenStorage};
pub use todos::TodosStore;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Non-success status; `message` comes from the failure envelope when present.
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("token storage failed: {0}")]
    Storage(#[from] std::io::Error),
}
