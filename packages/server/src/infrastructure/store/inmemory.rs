//! In-memory task store.
//!
//! HashMap-backed implementation of the `TaskStore` port, used by the demo
//! binary and the test suites. A production deployment would put a database
//! adapter behind the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::domain::{Task, TaskDraft, TaskId, TaskPatch, TaskStore, TaskStoreError, UserId};

#[derive(Default)]
pub struct InMemoryTaskStore {
    tasks: Mutex<HashMap<TaskId, Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        let tasks = self.tasks.lock().await;
        tasks.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, owner_id: UserId, draft: TaskDraft) -> Result<Task, TaskStoreError> {
        let now = Utc::now();
        let task = Task {
            id: TaskId::generate(),
            title: draft.title,
            description: draft.description,
            status: draft.status,
            position: draft.position,
            owner_id,
            created_at: now,
            updated_at: now,
        };
        let mut tasks = self.tasks.lock().await;
        tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get(&self, id: TaskId) -> Result<Task, TaskStoreError> {
        let tasks = self.tasks.lock().await;
        tasks.get(&id).cloned().ok_or(TaskStoreError::NotFound)
    }

    async fn update(&self, id: TaskId, patch: TaskPatch) -> Result<Task, TaskStoreError> {
        let mut tasks = self.tasks.lock().await;
        let task = tasks.get_mut(&id).ok_or(TaskStoreError::NotFound)?;
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(position) = patch.position {
            task.position = position;
        }
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete(&self, id: TaskId) -> Result<Task, TaskStoreError> {
        let mut tasks = self.tasks.lock().await;
        tasks.remove(&id).ok_or(TaskStoreError::NotFound)
    }

    async fn reorder(&self, batch: Vec<(TaskId, u32)>) -> Result<(), TaskStoreError> {
        let mut tasks = self.tasks.lock().await;
        // Validate the whole batch before touching any position so the
        // update applies as a set or not at all.
        for (id, _) in &batch {
            if !tasks.contains_key(id) {
                return Err(TaskStoreError::NotFound);
            }
        }
        let now = Utc::now();
        for (id, position) in batch {
            if let Some(task) = tasks.get_mut(&id) {
                task.position = position;
                task.updated_at = now;
            }
        }
        Ok(())
    }
}
