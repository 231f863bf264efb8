//! UseCase: task mutations driven by board events.
//!
//! Each operation requires an authenticated, board-joined connection.
//! Ownership is enforced here, before any persistence call: only the owning
//! user may update, delete or reorder a task, and a reorder batch is
//! authorized as a whole: one foreign task rejects the entire batch with
//! nothing applied.

use std::sync::Arc;

use crate::{
    domain::{
        BoardId, ConnectionId, Identity, Task, TaskDraft, TaskId, TaskPatch, TaskStore,
        TaskStoreError,
    },
    infrastructure::rooms::RoomManager,
};

use super::error::EventError;

pub struct TaskEventUseCase {
    rooms: Arc<RoomManager>,
    store: Arc<dyn TaskStore>,
}

impl TaskEventUseCase {
    pub fn new(rooms: Arc<RoomManager>, store: Arc<dyn TaskStore>) -> Self {
        Self { rooms, store }
    }

    /// Validate a draft and create the task, owned by the caller.
    ///
    /// Returns the board to notify and the created record. The record goes
    /// back to the originator directly as its call result; only peers get
    /// the `task_created` broadcast.
    pub async fn create(
        &self,
        identity: &Identity,
        connection_id: &ConnectionId,
        title: &str,
        description: Option<&str>,
        status: Option<&str>,
        position: Option<u32>,
    ) -> Result<(BoardId, Task), EventError> {
        let board_id = self.joined_board(connection_id).await?;
        let draft = TaskDraft::new(title, description, status, position)
            .map_err(EventError::Validation)?;
        let task = self.store.create(identity.user_id, draft).await?;
        tracing::info!(
            "Task '{}' created by '{}' on board '{}'",
            task.id,
            identity.username,
            board_id
        );
        Ok((board_id, task))
    }

    /// Validate a patch and apply it to a task the caller owns.
    ///
    /// Returns the board to notify, the updated record and the names of the
    /// changed fields.
    pub async fn update(
        &self,
        identity: &Identity,
        connection_id: &ConnectionId,
        task_id: TaskId,
        title: Option<&str>,
        description: Option<&str>,
        status: Option<&str>,
        position: Option<u32>,
    ) -> Result<(BoardId, Task, Vec<&'static str>), EventError> {
        let board_id = self.joined_board(connection_id).await?;
        let patch =
            TaskPatch::new(title, description, status, position).map_err(EventError::Validation)?;

        let existing = self.store.get(task_id).await?;
        self.check_ownership(identity, &existing, "update")?;

        let changes = patch.changed_fields();
        let updated = self.store.update(task_id, patch).await?;
        Ok((board_id, updated, changes))
    }

    /// Delete a task the caller owns, returning the removed record.
    pub async fn delete(
        &self,
        identity: &Identity,
        connection_id: &ConnectionId,
        task_id: TaskId,
    ) -> Result<(BoardId, Task), EventError> {
        let board_id = self.joined_board(connection_id).await?;

        let existing = self.store.get(task_id).await?;
        self.check_ownership(identity, &existing, "delete")?;

        let deleted = self.store.delete(task_id).await?;
        Ok((board_id, deleted))
    }

    /// Apply a batch of position updates as a single logical unit.
    ///
    /// The whole batch is authorized before anything is written: a missing
    /// task or one owned by another user rejects the batch with `Forbidden`
    /// and no position changed.
    pub async fn reorder(
        &self,
        identity: &Identity,
        connection_id: &ConnectionId,
        batch: Vec<(TaskId, u32)>,
    ) -> Result<(BoardId, usize), EventError> {
        let board_id = self.joined_board(connection_id).await?;
        if batch.is_empty() {
            return Err(EventError::Validation(vec![
                "Reorder batch cannot be empty".to_string(),
            ]));
        }

        for (task_id, _) in &batch {
            match self.store.get(*task_id).await {
                Ok(task) => self.check_ownership(identity, &task, "reorder")?,
                // A missing task is folded into the same rejection as a
                // foreign one; the batch reveals nothing about which.
                Err(TaskStoreError::NotFound) => {
                    tracing::warn!(
                        "User '{}' attempted to reorder unknown task '{}'",
                        identity.username,
                        task_id
                    );
                    return Err(EventError::Forbidden);
                }
                Err(err) => return Err(err.into()),
            }
        }

        let applied = batch.len();
        self.store.reorder(batch).await?;
        Ok((board_id, applied))
    }

    async fn joined_board(&self, connection_id: &ConnectionId) -> Result<BoardId, EventError> {
        self.rooms
            .board_of(connection_id)
            .await
            .ok_or(EventError::NotJoined)
    }

    fn check_ownership(
        &self,
        identity: &Identity,
        task: &Task,
        operation: &str,
    ) -> Result<(), EventError> {
        if task.owner_id != identity.user_id {
            // Potential abuse signal: a client addressed a task it does not
            // own. Ownership is not guessable from the UI.
            tracing::warn!(
                "User '{}' denied {} on task '{}' owned by another user",
                identity.username,
                operation,
                task.id
            );
            return Err(EventError::Forbidden);
        }
        Ok(())
    }
}
