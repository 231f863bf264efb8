//! Errors surfaced by the domain ports.

use thiserror::Error;

/// Failure reported by the credential verifier at handshake time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("User not found")]
    UserNotFound,
}

/// Failure reported by the persistence service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskStoreError {
    #[error("Task not found")]
    NotFound,
    #[error("Task store unavailable: {0}")]
    Unavailable(String),
}

/// Failure delivering a payload to a single connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventPushError {
    #[error("Connection '{0}' not found")]
    ConnectionNotFound(String),
    #[error("Failed to push event: {0}")]
    PushFailed(String),
}
