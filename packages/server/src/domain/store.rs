//! Persistence service port.
//!
//! Durable task storage is an external collaborator: the engine validates and
//! authorizes events, delegates every durable effect here, and relays the
//! results to room peers without caching them.

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{Task, TaskDraft, TaskId, TaskPatch, TaskStoreError, UserId};

/// Create/read/update/delete/reorder operations on task records.
///
/// Every method may fail with [`TaskStoreError::Unavailable`] when the
/// backing store cannot be reached; callers report that to the sender as a
/// retryable failure and drop the event.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Create a task owned by `owner_id` from a validated draft.
    async fn create(&self, owner_id: UserId, draft: TaskDraft) -> Result<Task, TaskStoreError>;

    /// Fetch a task by id.
    async fn get(&self, id: TaskId) -> Result<Task, TaskStoreError>;

    /// Apply a validated partial update and return the updated record.
    async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Task, TaskStoreError>;

    /// Delete a task and return the removed record.
    async fn delete(&self, id: TaskId) -> Result<Task, TaskStoreError>;

    /// Apply a batch of `(task id, new position)` pairs as a single logical
    /// unit: either every position is updated or none is.
    async fn reorder(&self, batch: Vec<(TaskId, u32)>) -> Result<(), TaskStoreError>;
}
