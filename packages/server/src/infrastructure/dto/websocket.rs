//! JSON message shapes carried over the WebSocket transport.
//!
//! Inbound frames are an internally tagged envelope: a `"type"` field naming
//! the event, an optional `"request_id"` string when the sender wants an
//! acknowledgement, and the event fields inline. Outbound messages are one
//! struct per event, each tagged through its `r#type` field.
//!
//! Acknowledgement contract: an inbound event carrying a `request_id`
//! receives exactly one `ack` reply, success fields or an `error` string,
//! never both, never more than one.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Task;
use liveboard_shared::time::iso_timestamp;

/// Outbound message discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    UserJoined,
    UserLeft,
    TaskCreated,
    TaskUpdated,
    TaskDeleted,
    TasksReordered,
    UserTyping,
    CursorMoved,
    TaskFocused,
    TaskBlurred,
    Ack,
    Error,
}

/// Inbound client events. `request_id` is extracted from the envelope by the
/// handler before this enum is deserialized.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinBoard {
        board_id: Option<String>,
    },
    LeaveBoard {
        board_id: Option<String>,
    },
    CreateTask {
        title: String,
        description: Option<String>,
        status: Option<String>,
        position: Option<u32>,
    },
    UpdateTask {
        id: Uuid,
        title: Option<String>,
        description: Option<String>,
        status: Option<String>,
        position: Option<u32>,
    },
    DeleteTask {
        id: Uuid,
    },
    ReorderTasks {
        tasks: Vec<TaskPositionDto>,
    },
    UserTyping {
        task_id: Option<Uuid>,
        is_typing: bool,
    },
    CursorMove {
        task_id: Option<Uuid>,
        x: f64,
        y: f64,
    },
    TaskFocus {
        task_id: Uuid,
    },
    TaskBlur {
        task_id: Uuid,
    },
    Ping,
    GetBoardStats {
        board_id: Option<String>,
    },
}

/// One `(task id, new position)` pair of a reorder batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPositionDto {
    pub id: Uuid,
    pub position: u32,
}

/// A task record as relayed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub position: u32,
    pub owner_id: Uuid,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Task> for TaskDto {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.as_uuid(),
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status.as_str().to_string(),
            position: task.position,
            owner_id: task.owner_id.as_uuid(),
            created_at: task.created_at.to_rfc3339(),
            updated_at: task.updated_at.to_rfc3339(),
        }
    }
}

// ---- membership notifications ----

#[derive(Debug, Serialize, Deserialize)]
pub struct UserJoinedMessage {
    pub r#type: EventType,
    pub user_id: Uuid,
    pub username: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserLeftMessage {
    pub r#type: EventType,
    pub user_id: Uuid,
    pub username: String,
    pub timestamp: String,
}

// ---- task change notifications ----

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskCreatedMessage {
    pub r#type: EventType,
    pub task: TaskDto,
    pub created_by: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskUpdatedMessage {
    pub r#type: EventType,
    pub task: TaskDto,
    pub updated_by: String,
    /// Names of the fields the update changed.
    pub changes: Vec<String>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskDeletedMessage {
    pub r#type: EventType,
    pub task_id: Uuid,
    /// Carried for UI toast purposes.
    pub task_title: String,
    pub deleted_by: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TasksReorderedMessage {
    pub r#type: EventType,
    pub tasks: Vec<TaskPositionDto>,
    pub reordered_by: String,
    pub timestamp: String,
}

// ---- presence notifications ----

#[derive(Debug, Serialize, Deserialize)]
pub struct UserTypingMessage {
    pub r#type: EventType,
    pub user_id: Uuid,
    pub username: String,
    pub task_id: Option<Uuid>,
    pub is_typing: bool,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CursorPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CursorMovedMessage {
    pub r#type: EventType,
    pub user_id: Uuid,
    pub username: String,
    pub task_id: Option<Uuid>,
    pub position: CursorPosition,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskFocusMessage {
    pub r#type: EventType,
    pub user_id: Uuid,
    pub username: String,
    pub task_id: Uuid,
    pub timestamp: String,
}

// ---- acknowledgements and errors ----

#[derive(Debug, Serialize, Deserialize)]
pub struct AckErrorMessage {
    pub r#type: EventType,
    pub request_id: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinBoardAck {
    pub r#type: EventType,
    pub request_id: String,
    pub success: bool,
    pub board_id: String,
    pub users_in_room: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaveBoardAck {
    pub r#type: EventType,
    pub request_id: String,
    pub success: bool,
    pub board_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskAck {
    pub r#type: EventType,
    pub request_id: String,
    pub success: bool,
    pub task: TaskDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskDeletedAck {
    pub r#type: EventType,
    pub request_id: String,
    pub success: bool,
    pub task_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TasksReorderedAck {
    pub r#type: EventType,
    pub request_id: String,
    pub success: bool,
    pub reordered: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PresenceAck {
    pub r#type: EventType,
    pub request_id: String,
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PongAck {
    pub r#type: EventType,
    pub request_id: String,
    pub success: bool,
    pub pong: bool,
    pub server_time: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BoardStatsDto {
    pub board_id: String,
    pub connected_users: usize,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BoardStatsAck {
    pub r#type: EventType,
    pub request_id: String,
    pub success: bool,
    pub stats: BoardStatsDto,
}

/// Standalone error report for events sent without a `request_id`
/// (rate-limit rejections among them).
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub r#type: EventType,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorMessage {
    pub fn new(error: impl Into<String>, details: Option<Vec<String>>) -> Self {
        Self {
            r#type: EventType::Error,
            error: error.into(),
            details,
        }
    }
}

impl UserJoinedMessage {
    pub fn now(user_id: Uuid, username: impl Into<String>) -> Self {
        Self {
            r#type: EventType::UserJoined,
            user_id,
            username: username.into(),
            timestamp: iso_timestamp(),
        }
    }
}

impl UserLeftMessage {
    pub fn now(user_id: Uuid, username: impl Into<String>) -> Self {
        Self {
            r#type: EventType::UserLeft,
            user_id,
            username: username.into(),
            timestamp: iso_timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_event_parses_with_request_id_ignored() {
        let event: ClientEvent = serde_json::from_str(
            r#"{"type":"join_board","board_id":"main-board","request_id":"r1"}"#,
        )
        .unwrap();
        assert!(matches!(
            event,
            ClientEvent::JoinBoard { board_id: Some(ref b) } if b == "main-board"
        ));
    }

    #[test]
    fn test_inbound_create_task_optional_fields() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"type":"create_task","title":"Buy milk"}"#).unwrap();
        match event {
            ClientEvent::CreateTask {
                title,
                description,
                status,
                position,
            } => {
                assert_eq!(title, "Buy milk");
                assert!(description.is_none());
                assert!(status.is_none());
                assert!(position.is_none());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        let result = serde_json::from_str::<ClientEvent>(r#"{"type":"drop_tables"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_user_joined_wire_shape() {
        let msg = UserJoinedMessage::now(Uuid::new_v4(), "alice");
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&msg).unwrap()).unwrap();
        assert_eq!(json["type"], "user_joined");
        assert_eq!(json["username"], "alice");
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_error_message_omits_empty_details() {
        let msg = ErrorMessage::new("Rate limit exceeded", None);
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"error","error":"Rate limit exceeded"}"#);
    }
}
