//! Core value objects and entities.
//!
//! Identifiers are newtypes over `Uuid` (generated server-side), board ids
//! are validated strings, and task drafts/patches validate their input
//! collecting *every* violation so a client can fix a bad form in one round
//! trip instead of one error at a time.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Maximum length of a task title, in characters.
pub const MAX_TITLE_LEN: usize = 255;
/// Maximum length of a task description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 2000;
/// Maximum length of a board id, in characters.
const MAX_BOARD_ID_LEN: usize = 64;

/// Unique identifier of one live client connection.
///
/// Generated by the transport layer at handshake time; unique for the
/// lifetime of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a task record in the persistence service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Name of a board room. Non-empty, trimmed, at most 64 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoardId(String);

impl BoardId {
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err("Board id cannot be empty".to_string());
        }
        if trimmed.chars().count() > MAX_BOARD_ID_LEN {
            return Err(format!(
                "Board id must not exceed {MAX_BOARD_ID_LEN} characters"
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for BoardId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// The authenticated user behind a connection.
///
/// Sourced from the credential verifier at handshake time; read-only
/// thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
}

impl Identity {
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}

/// Task workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Active,
    Complete,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Pending, TaskStatus::Active, TaskStatus::Complete];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Active => "active",
            TaskStatus::Complete => "complete",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(TaskStatus::Pending),
            "active" => Some(TaskStatus::Active),
            "complete" => Some(TaskStatus::Complete),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task record as held by the persistence service.
///
/// The engine never caches these beyond relaying them to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub position: u32,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub position: u32,
}

impl TaskDraft {
    /// Validate raw client input into a draft, collecting all violations.
    pub fn new(
        title: &str,
        description: Option<&str>,
        status: Option<&str>,
        position: Option<u32>,
    ) -> Result<Self, Vec<String>> {
        let mut violations = Vec::new();

        let title = title.trim();
        if title.is_empty() {
            violations.push("Task title cannot be empty".to_string());
        } else if title.chars().count() > MAX_TITLE_LEN {
            violations.push(format!("Task title must not exceed {MAX_TITLE_LEN} characters"));
        }

        let description = description.unwrap_or("").trim().to_string();
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            violations.push(format!(
                "Task description must not exceed {MAX_DESCRIPTION_LEN} characters"
            ));
        }

        let status = match status {
            None => TaskStatus::Pending,
            Some(raw) => match TaskStatus::parse(raw) {
                Some(status) => status,
                None => {
                    violations.push(invalid_status_message(raw));
                    TaskStatus::Pending
                }
            },
        };

        if violations.is_empty() {
            Ok(Self {
                title: title.to_string(),
                description,
                status,
                position: position.unwrap_or(0),
            })
        } else {
            Err(violations)
        }
    }
}

/// Validated partial update of a task. At least one field must be present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub position: Option<u32>,
}

impl TaskPatch {
    /// Validate raw client input into a patch, collecting all violations.
    pub fn new(
        title: Option<&str>,
        description: Option<&str>,
        status: Option<&str>,
        position: Option<u32>,
    ) -> Result<Self, Vec<String>> {
        let mut violations = Vec::new();

        if title.is_none() && description.is_none() && status.is_none() && position.is_none() {
            violations.push("At least one field is required for an update".to_string());
        }

        let title = title.map(|raw| {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                violations.push("Task title cannot be empty".to_string());
            } else if trimmed.chars().count() > MAX_TITLE_LEN {
                violations.push(format!("Task title must not exceed {MAX_TITLE_LEN} characters"));
            }
            trimmed.to_string()
        });

        let description = description.map(|raw| {
            let trimmed = raw.trim();
            if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
                violations.push(format!(
                    "Task description must not exceed {MAX_DESCRIPTION_LEN} characters"
                ));
            }
            trimmed.to_string()
        });

        let status = status.and_then(|raw| match TaskStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                violations.push(invalid_status_message(raw));
                None
            }
        });

        if violations.is_empty() {
            Ok(Self {
                title,
                description,
                status,
                position,
            })
        } else {
            Err(violations)
        }
    }

    /// Names of the fields this patch changes, for `task_updated` broadcasts.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.position.is_some() {
            fields.push("position");
        }
        fields
    }
}

fn invalid_status_message(raw: &str) -> String {
    let allowed = TaskStatus::ALL
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!("Status '{raw}' is invalid; must be one of: {allowed}")
}
