//! UseCase error taxonomy.
//!
//! Every failure here is handled at the point of the single event that
//! triggered it: reported to the sender, never broadcast, never allowed to
//! affect other connections or the process.

use thiserror::Error;

use crate::domain::{AuthError, TaskStoreError};

/// Handshake failure; the connection is refused before upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("Authentication token required")]
    MissingCredential,
    #[error(transparent)]
    Rejected(#[from] AuthError),
}

/// Failure processing one inbound event from an established connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// Malformed payload; carries every violation, not just the first.
    #[error("Invalid event payload")]
    Validation(Vec<String>),
    #[error("Task not found")]
    NotFound,
    #[error("Access denied: you can only modify your own tasks")]
    Forbidden,
    #[error("Not joined to a board")]
    NotJoined,
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Task store unavailable, please retry")]
    StoreUnavailable,
}

impl EventError {
    /// Violation list for validation failures, for the `details` field of
    /// error replies.
    pub fn details(&self) -> Option<Vec<String>> {
        match self {
            EventError::Validation(violations) => Some(violations.clone()),
            _ => None,
        }
    }
}

impl From<TaskStoreError> for EventError {
    fn from(err: TaskStoreError) -> Self {
        match err {
            TaskStoreError::NotFound => EventError::NotFound,
            TaskStoreError::Unavailable(reason) => {
                tracing::error!("Task store unavailable: {}", reason);
                EventError::StoreUnavailable
            }
        }
    }
}
