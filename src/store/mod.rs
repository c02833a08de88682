//! Task persistence.
//!
//! [`TaskGateway`] is the single data-access surface the HTTP handlers talk
//! to. It is constructed once at startup and handed to the router inside
//! `AppState`, so tests can inject their own implementation.

mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use crate::task::{NewTask, Task, TaskFilter, TaskId, TaskPatch};

pub use sqlite::SqliteTaskStore;

/// Storage failure. The gateway never retries.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("task {0} not found")]
    NotFound(TaskId),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("corrupt row: {0}")]
    Corrupt(String),
    #[error("storage worker failed: {0}")]
    Worker(String),
}

/// CRUD over the task table. Every call is a single-statement operation.
#[async_trait]
pub trait TaskGateway: Send + Sync {
    /// Insert a task; id, timestamps and `completed = false` are assigned here.
    async fn create(&self, task: NewTask) -> Result<Task, StoreError>;

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, StoreError>;

    /// Tasks matching `filter`, newest first.
    async fn list(&self, filter: TaskFilter) -> Result<Vec<Task>, StoreError>;

    /// Apply `patch` and bump `updated_at`. Missing row → [`StoreError::NotFound`].
    async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Task, StoreError>;

    /// Permanently remove a task. Missing row → [`StoreError::NotFound`].
    async fn delete(&self, id: TaskId) -> Result<(), StoreError>;
}

/// Shared gateway handle held by the application state.
pub type SharedTaskGateway = Arc<dyn TaskGateway>;
