//! WebSocket client session management.

use futures_util::{SinkExt, StreamExt};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use liveboard_server::infrastructure::dto::websocket::{
    CursorMovedMessage, ErrorMessage, TaskCreatedMessage, TaskDeletedMessage, TaskFocusMessage,
    TaskUpdatedMessage, TasksReorderedMessage, UserJoinedMessage, UserLeftMessage,
    UserTypingMessage,
};

use crate::{
    command::{Command, HELP, parse_command},
    error::ClientError,
    formatter::EventFormatter,
    ui::redisplay_prompt,
};

/// Run the WebSocket client session
pub async fn run_client_session(
    url: &str,
    token: &str,
    username: &str,
    board: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Pass the token as a query parameter for the handshake
    let url = format!("{}?token={}", url, token);

    let (ws_stream, response) = match connect_async(&url).await {
        Ok(result) => result,
        Err(e) => {
            let error_msg = e.to_string();

            // Check for HTTP 401 Unauthorized
            if error_msg.contains("401") || error_msg.contains("Unauthorized") {
                return Err(Box::new(ClientError::Unauthorized));
            }

            return Err(Box::new(ClientError::ConnectionError(error_msg)));
        }
    };

    if response.status().as_u16() == 401 {
        return Err(Box::new(ClientError::Unauthorized));
    }

    tracing::info!("Connected to board server!");
    println!(
        "\nYou are '{}'. Type /help for commands. Press Ctrl+C to exit.\n",
        username
    );

    let (mut write, mut read) = ws_stream.split();

    // Land on a board right away so task commands work without a manual /join
    let join = match board {
        Some(board) => serde_json::json!({
            "type": "join_board",
            "board_id": board,
            "request_id": "req-0",
        }),
        None => serde_json::json!({"type": "join_board", "request_id": "req-0"}),
    };
    write.send(Message::Text(join.to_string().into())).await?;

    let username_for_read = username.to_string();

    // Spawn a task to handle incoming events
    let mut read_task = tokio::spawn(async move {
        let mut connection_error = false;

        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    print!("{}", render_event(&text));
                    redisplay_prompt(&username_for_read);
                }
                Ok(Message::Binary(data)) => {
                    print!("{}", EventFormatter::format_binary_message(data.len()));
                    redisplay_prompt(&username_for_read);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    connection_error = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    connection_error = true;
                    break;
                }
                _ => {}
            }
        }

        connection_error
    });

    let username = username.to_string();
    let username_for_prompt = username.clone();

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", username_for_prompt);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Spawn a task to turn input lines into events and send them
    let mut write_task = tokio::spawn(async move {
        let mut write_error = false;
        // req-0 was the automatic join
        let mut request_seq: u64 = 1;

        while let Some(line) = input_rx.recv().await {
            let event = match parse_command(&line) {
                Ok(Command::Event(mut event)) => {
                    if let Value::Object(fields) = &mut event {
                        fields.insert(
                            "request_id".to_string(),
                            Value::String(format!("req-{request_seq}")),
                        );
                        request_seq += 1;
                    }
                    event
                }
                Ok(Command::Help) => {
                    print!("\n{}", HELP);
                    redisplay_prompt(&username);
                    continue;
                }
                Err(usage) => {
                    println!("\n{}", usage);
                    redisplay_prompt(&username);
                    continue;
                }
            };

            if let Err(e) = write.send(Message::Text(event.to_string().into())).await {
                tracing::warn!("Failed to send event: {}", e);
                write_error = true;
                break;
            }
        }

        write_error
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            let connection_error = read_result.unwrap_or(false);
            if connection_error {
                return Err(Box::new(ClientError::ConnectionError(
                    "Connection lost".to_string(),
                )));
            }
        }
        write_result = &mut write_task => {
            read_task.abort();
            let write_error = write_result.unwrap_or(false);
            if write_error {
                return Err(Box::new(ClientError::ConnectionError(
                    "Connection lost".to_string(),
                )));
            }
        }
    }

    Ok(())
}

/// Render one inbound frame for display.
fn render_event(text: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(text) else {
        return EventFormatter::format_raw_message(text);
    };
    let Some(event_type) = value
        .get("type")
        .and_then(|t| t.as_str())
        .map(str::to_owned)
    else {
        return EventFormatter::format_raw_message(text);
    };

    match event_type.as_str() {
        "user_joined" => match serde_json::from_value::<UserJoinedMessage>(value) {
            Ok(msg) => EventFormatter::format_user_joined(&msg.username, &msg.timestamp),
            Err(_) => EventFormatter::format_raw_message(text),
        },
        "user_left" => match serde_json::from_value::<UserLeftMessage>(value) {
            Ok(msg) => EventFormatter::format_user_left(&msg.username, &msg.timestamp),
            Err(_) => EventFormatter::format_raw_message(text),
        },
        "task_created" => match serde_json::from_value::<TaskCreatedMessage>(value) {
            Ok(msg) => EventFormatter::format_task_created(
                &msg.task.title,
                &msg.task.id.to_string(),
                &msg.created_by,
            ),
            Err(_) => EventFormatter::format_raw_message(text),
        },
        "task_updated" => match serde_json::from_value::<TaskUpdatedMessage>(value) {
            Ok(msg) => {
                EventFormatter::format_task_updated(&msg.task.title, &msg.updated_by, &msg.changes)
            }
            Err(_) => EventFormatter::format_raw_message(text),
        },
        "task_deleted" => match serde_json::from_value::<TaskDeletedMessage>(value) {
            Ok(msg) => EventFormatter::format_task_deleted(&msg.task_title, &msg.deleted_by),
            Err(_) => EventFormatter::format_raw_message(text),
        },
        "tasks_reordered" => match serde_json::from_value::<TasksReorderedMessage>(value) {
            Ok(msg) => EventFormatter::format_tasks_reordered(msg.tasks.len(), &msg.reordered_by),
            Err(_) => EventFormatter::format_raw_message(text),
        },
        "user_typing" => match serde_json::from_value::<UserTypingMessage>(value) {
            Ok(msg) => EventFormatter::format_user_typing(&msg.username, msg.is_typing),
            Err(_) => EventFormatter::format_raw_message(text),
        },
        "cursor_moved" => match serde_json::from_value::<CursorMovedMessage>(value) {
            Ok(msg) => {
                EventFormatter::format_cursor_moved(&msg.username, msg.position.x, msg.position.y)
            }
            Err(_) => EventFormatter::format_raw_message(text),
        },
        "task_focused" | "task_blurred" => {
            match serde_json::from_value::<TaskFocusMessage>(value) {
                Ok(msg) => EventFormatter::format_task_focus(
                    &msg.username,
                    &msg.task_id.to_string(),
                    event_type == "task_focused",
                ),
                Err(_) => EventFormatter::format_raw_message(text),
            }
        }
        "ack" => render_ack(&value, text),
        "error" => match serde_json::from_value::<ErrorMessage>(value) {
            Ok(msg) => EventFormatter::format_error(&msg.error, msg.details.as_deref()),
            Err(_) => EventFormatter::format_raw_message(text),
        },
        _ => EventFormatter::format_raw_message(text),
    }
}

/// Render a call acknowledgement from its distinguishing fields.
fn render_ack(value: &Value, text: &str) -> String {
    if let Some(error) = value.get("error").and_then(|e| e.as_str()) {
        let details: Option<Vec<String>> = value
            .get("details")
            .and_then(|d| serde_json::from_value(d.clone()).ok());
        return EventFormatter::format_error(error, details.as_deref());
    }
    if value.get("pong").is_some() {
        let server_time = value
            .get("server_time")
            .and_then(|t| t.as_str())
            .unwrap_or("?");
        return EventFormatter::format_pong(server_time);
    }
    if let Some(stats) = value.get("stats") {
        let board_id = stats
            .get("board_id")
            .and_then(|b| b.as_str())
            .unwrap_or("?");
        let connected = stats
            .get("connected_users")
            .and_then(|c| c.as_u64())
            .unwrap_or(0) as usize;
        return EventFormatter::format_stats(board_id, connected);
    }
    if let (Some(board_id), Some(users)) = (
        value.get("board_id").and_then(|b| b.as_str()),
        value.get("users_in_room").and_then(|u| u.as_u64()),
    ) {
        return EventFormatter::format_joined(board_id, users as usize);
    }
    if let Some(task) = value.get("task") {
        let title = task.get("title").and_then(|t| t.as_str()).unwrap_or("?");
        return format!("\n* ok: task '{}'\n", title);
    }
    if value.get("success").and_then(|s| s.as_bool()) == Some(true) {
        return "\n* ok\n".to_string();
    }
    EventFormatter::format_raw_message(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_user_joined_event() {
        // given:
        let text = format!(
            r#"{{"type":"user_joined","user_id":"{}","username":"bob","timestamp":"2026-01-01T09:00:00Z"}}"#,
            uuid_str()
        );

        // when:
        let rendered = render_event(&text);

        // then:
        assert!(rendered.contains("+ bob joined at"));
    }

    #[test]
    fn test_render_join_ack() {
        // given:
        let text = r#"{"type":"ack","request_id":"req-0","success":true,"board_id":"main-board","users_in_room":2}"#;

        // when:
        let rendered = render_event(text);

        // then:
        assert!(rendered.contains("Joined board 'main-board'"));
        assert!(rendered.contains("2 members"));
    }

    #[test]
    fn test_render_error_ack() {
        // given:
        let text = r#"{"type":"ack","request_id":"req-3","error":"Validation failed","details":["Title cannot be empty"]}"#;

        // when:
        let rendered = render_event(text);

        // then:
        assert!(rendered.contains("Validation failed: Title cannot be empty"));
    }

    #[test]
    fn test_render_standalone_error() {
        // given:
        let text = r#"{"type":"error","error":"Rate limit exceeded"}"#;

        // when:
        let rendered = render_event(text);

        // then:
        assert!(rendered.contains("! Rate limit exceeded"));
    }

    #[test]
    fn test_render_pong_ack() {
        // given:
        let text = r#"{"type":"ack","request_id":"req-9","success":true,"pong":true,"server_time":"2026-01-01T09:00:00Z"}"#;

        // when:
        let rendered = render_event(text);

        // then:
        assert!(rendered.contains("pong, server time 2026-01-01"));
    }

    #[test]
    fn test_render_unknown_payload_falls_back_to_raw() {
        // given:
        let text = r#"{"type":"mystery"}"#;

        // when:
        let rendered = render_event(text);

        // then:
        assert!(rendered.contains("Received:"));
    }

    fn uuid_str() -> &'static str {
        "0191b2c8-0000-7000-8000-000000000001"
    }
}
