use std::time::Duration;

use async_trait::async_trait;

use super::dto::{CreateTaskRequest, UpdateTaskRequest};
use super::model::{Pagination, Task, TaskFilters};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    /// A write succeeded but the row was gone when read back.
    #[error("task {id} vanished between write and read-back")]
    Inconsistent { id: i64 },
}

impl StoreError {
    /// Whether the same call could succeed if issued again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Timeout(_)
                | StoreError::Database(sqlx::Error::PoolTimedOut)
                | StoreError::Database(sqlx::Error::Io(_))
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for tasks. Requests reaching a store are already validated.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// One page of matching tasks, newest first, plus page metadata.
    async fn query(&self, filters: &TaskFilters) -> StoreResult<(Vec<Task>, Pagination)>;

    async fn get_by_id(&self, id: i64) -> StoreResult<Option<Task>>;

    async fn create(&self, request: &CreateTaskRequest) -> StoreResult<Task>;

    /// `None` when no task has this id. An empty request returns the stored
    /// task untouched.
    async fn update(&self, id: i64, request: &UpdateTaskRequest) -> StoreResult<Option<Task>>;

    /// `false` when no task has this id.
    async fn delete(&self, id: i64) -> StoreResult<bool>;
}
