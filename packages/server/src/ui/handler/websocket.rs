//! WebSocket connection handler and event dispatch.
//!
//! One accepted connection gets one unbounded outbound channel (pumped into
//! the socket sink by `pusher_loop`) and one sequential receive loop: inbound
//! events from a single connection are processed one at a time in arrival
//! order, so a client's own mutations can never be applied out of order.
//! Events from different connections run concurrently.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{Stream, sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::{mpsc, watch};

use crate::{
    domain::{ConnectionId, Identity, TaskId},
    infrastructure::{
        dto::websocket::{
            AckErrorMessage, BoardStatsAck, BoardStatsDto, ClientEvent, CursorMovedMessage,
            CursorPosition, ErrorMessage, EventType, JoinBoardAck, LeaveBoardAck, PongAck,
            PresenceAck, TaskAck, TaskCreatedMessage, TaskDeletedAck, TaskDeletedMessage,
            TaskDto, TaskFocusMessage, TaskUpdatedMessage, TasksReorderedAck,
            TasksReorderedMessage, UserJoinedMessage, UserLeftMessage, UserTypingMessage,
        },
        rate_limit::EventClass,
    },
    ui::state::AppState,
    usecase::{ConnectError, EventError},
};
use liveboard_shared::time::iso_timestamp;

/// Query parameters for the WebSocket handshake.
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let connection_id = ConnectionId::generate();

    // The outbound channel is registered before the upgrade, so a refused
    // handshake never becomes visible to any board.
    let (tx, rx) = mpsc::unbounded_channel();

    match state
        .connect_usecase
        .execute(query.token.as_deref(), connection_id, tx)
        .await
    {
        Ok(identity) => Ok(ws.on_upgrade(move |socket| {
            handle_socket(socket, state, connection_id, identity, rx)
        })),
        Err(ConnectError::MissingCredential) => {
            tracing::warn!("Handshake without credential refused");
            Err(StatusCode::UNAUTHORIZED)
        }
        Err(ConnectError::Rejected(reason)) => {
            tracing::warn!("Handshake credential rejected: {}", reason);
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Spawns a task that drains the connection's channel into the socket sink,
/// preserving push order per recipient.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Sequential receive loop for one connection.
///
/// Inbound events are handled one at a time in arrival order. The stop
/// signal is only honored between events, never in the middle of one, so a
/// dispatched event always completes its side effects.
async fn recv_loop<S>(
    mut receiver: S,
    mut stop: watch::Receiver<bool>,
    state: Arc<AppState>,
    connection_id: ConnectionId,
    identity: Identity,
) where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin + Send + 'static,
{
    loop {
        let msg = tokio::select! {
            _ = stop.changed() => break,
            msg = receiver.next() => msg,
        };
        let Some(msg) = msg else { break };
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!("WebSocket error on '{}': {}", connection_id, e);
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                dispatch(&state, connection_id, &identity, &text).await;
            }
            Message::Close(_) => {
                tracing::info!("Connection '{}' requested close", connection_id);
                break;
            }
            // Ping/pong frames are handled by the protocol layer
            _ => {}
        }
    }
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    connection_id: ConnectionId,
    identity: Identity,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let (sender, receiver) = socket.split();

    let mut send_task = pusher_loop(rx, sender);

    let (stop_tx, stop_rx) = watch::channel(false);
    let mut recv_task = tokio::spawn(recv_loop(
        receiver,
        stop_rx,
        state.clone(),
        connection_id,
        identity.clone(),
    ));

    // When the receive side ends there is nothing left to serve, so the sink
    // pump is aborted. When the sink dies first, the receive loop is signaled
    // to stop between events: one already past its store write still reaches
    // the board before the loop exits.
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => {
            let _ = stop_tx.send(true);
            let _ = recv_task.await;
        }
    };

    // Teardown is idempotent: a second pass finds the registry entry gone
    // and broadcasts nothing.
    if let Some(outcome) = state.disconnect_usecase.execute(connection_id).await {
        if let Some(left) = outcome.left {
            let msg = UserLeftMessage::now(
                outcome.identity.user_id.as_uuid(),
                &outcome.identity.username,
            );
            let payload = serde_json::to_string(&msg).unwrap();
            state.broadcaster.to_targets(left.peers, &payload).await;
        }
        tracing::info!(
            "Connection '{}' ('{}') closed",
            connection_id,
            outcome.identity.username
        );
    }
}

/// Rate-limit class for an inbound event type.
fn rate_class(event_type: &str) -> EventClass {
    match event_type {
        "user_typing" | "task_focus" | "task_blur" => EventClass::Presence,
        "cursor_move" => EventClass::Cursor,
        "ping" => EventClass::Ping,
        _ => EventClass::Mutation,
    }
}

fn is_presence(event_type: &str) -> bool {
    matches!(
        event_type,
        "user_typing" | "cursor_move" | "task_focus" | "task_blur"
    )
}

/// Process one inbound frame: parse, rate-limit, execute, reply.
///
/// Reply discipline: an event carrying a `request_id` gets exactly one ack
/// (success or error); errors on events without one are reported as a
/// standalone error message. Malformed presence payloads are dropped
/// silently, they carry no durable consequence.
async fn dispatch(
    state: &Arc<AppState>,
    connection_id: ConnectionId,
    identity: &Identity,
    text: &str,
) {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("Unparseable frame from '{}': {}", connection_id, e);
            reply_error(state, &connection_id, None, "Invalid JSON payload", None).await;
            return;
        }
    };

    let Some(event_type) = value.get("type").and_then(|t| t.as_str()).map(str::to_owned)
    else {
        reply_error(state, &connection_id, None, "Missing event type", None).await;
        return;
    };
    let request_id = value
        .get("request_id")
        .and_then(|r| r.as_str())
        .map(str::to_owned);

    // Admission control runs before any business logic.
    if !state
        .limiter
        .admit(&identity.user_id, rate_class(&event_type))
        .await
    {
        tracing::warn!(
            "Rate limit exceeded for user '{}' on '{}'",
            identity.username,
            event_type
        );
        reply_event_error(state, &connection_id, request_id, EventError::RateLimited).await;
        return;
    }

    let event = match serde_json::from_value::<ClientEvent>(value) {
        Ok(event) => event,
        Err(e) => {
            if is_presence(&event_type) {
                tracing::debug!(
                    "Dropping malformed presence event '{}' from '{}': {}",
                    event_type,
                    connection_id,
                    e
                );
                return;
            }
            reply_error(
                state,
                &connection_id,
                request_id,
                "Invalid event payload",
                Some(vec![e.to_string()]),
            )
            .await;
            return;
        }
    };

    match event {
        ClientEvent::JoinBoard { board_id } => {
            handle_join_board(state, connection_id, identity, board_id, request_id).await;
        }
        ClientEvent::LeaveBoard { board_id } => {
            handle_leave_board(state, connection_id, identity, board_id, request_id).await;
        }
        ClientEvent::CreateTask {
            title,
            description,
            status,
            position,
        } => {
            let result = state
                .task_events_usecase
                .create(
                    identity,
                    &connection_id,
                    &title,
                    description.as_deref(),
                    status.as_deref(),
                    position,
                )
                .await;
            match result {
                Ok((board_id, task)) => {
                    let broadcast = TaskCreatedMessage {
                        r#type: EventType::TaskCreated,
                        task: TaskDto::from(&task),
                        created_by: identity.username.clone(),
                        timestamp: iso_timestamp(),
                    };
                    let payload = serde_json::to_string(&broadcast).unwrap();
                    state
                        .broadcaster
                        .to_board(&board_id, &payload, Some(&connection_id))
                        .await;

                    // The created record goes back to the originator as the
                    // call result, not via broadcast.
                    if let Some(request_id) = request_id {
                        let ack = TaskAck {
                            r#type: EventType::Ack,
                            request_id,
                            success: true,
                            task: TaskDto::from(&task),
                        };
                        reply(state, &connection_id, serde_json::to_string(&ack).unwrap())
                            .await;
                    }
                }
                Err(err) => reply_event_error(state, &connection_id, request_id, err).await,
            }
        }
        ClientEvent::UpdateTask {
            id,
            title,
            description,
            status,
            position,
        } => {
            let result = state
                .task_events_usecase
                .update(
                    identity,
                    &connection_id,
                    TaskId::new(id),
                    title.as_deref(),
                    description.as_deref(),
                    status.as_deref(),
                    position,
                )
                .await;
            match result {
                Ok((board_id, task, changes)) => {
                    let broadcast = TaskUpdatedMessage {
                        r#type: EventType::TaskUpdated,
                        task: TaskDto::from(&task),
                        updated_by: identity.username.clone(),
                        changes: changes.iter().map(|c| c.to_string()).collect(),
                        timestamp: iso_timestamp(),
                    };
                    let payload = serde_json::to_string(&broadcast).unwrap();
                    state
                        .broadcaster
                        .to_board(&board_id, &payload, Some(&connection_id))
                        .await;

                    if let Some(request_id) = request_id {
                        let ack = TaskAck {
                            r#type: EventType::Ack,
                            request_id,
                            success: true,
                            task: TaskDto::from(&task),
                        };
                        reply(state, &connection_id, serde_json::to_string(&ack).unwrap())
                            .await;
                    }
                }
                Err(err) => reply_event_error(state, &connection_id, request_id, err).await,
            }
        }
        ClientEvent::DeleteTask { id } => {
            let result = state
                .task_events_usecase
                .delete(identity, &connection_id, TaskId::new(id))
                .await;
            match result {
                Ok((board_id, task)) => {
                    let broadcast = TaskDeletedMessage {
                        r#type: EventType::TaskDeleted,
                        task_id: task.id.as_uuid(),
                        task_title: task.title.clone(),
                        deleted_by: identity.username.clone(),
                        timestamp: iso_timestamp(),
                    };
                    let payload = serde_json::to_string(&broadcast).unwrap();
                    state
                        .broadcaster
                        .to_board(&board_id, &payload, Some(&connection_id))
                        .await;

                    if let Some(request_id) = request_id {
                        let ack = TaskDeletedAck {
                            r#type: EventType::Ack,
                            request_id,
                            success: true,
                            task_id: task.id.as_uuid(),
                        };
                        reply(state, &connection_id, serde_json::to_string(&ack).unwrap())
                            .await;
                    }
                }
                Err(err) => reply_event_error(state, &connection_id, request_id, err).await,
            }
        }
        ClientEvent::ReorderTasks { tasks } => {
            let batch: Vec<(TaskId, u32)> = tasks
                .iter()
                .map(|pair| (TaskId::new(pair.id), pair.position))
                .collect();
            let result = state
                .task_events_usecase
                .reorder(identity, &connection_id, batch)
                .await;
            match result {
                Ok((board_id, reordered)) => {
                    let broadcast = TasksReorderedMessage {
                        r#type: EventType::TasksReordered,
                        tasks,
                        reordered_by: identity.username.clone(),
                        timestamp: iso_timestamp(),
                    };
                    let payload = serde_json::to_string(&broadcast).unwrap();
                    state
                        .broadcaster
                        .to_board(&board_id, &payload, Some(&connection_id))
                        .await;

                    if let Some(request_id) = request_id {
                        let ack = TasksReorderedAck {
                            r#type: EventType::Ack,
                            request_id,
                            success: true,
                            reordered,
                        };
                        reply(state, &connection_id, serde_json::to_string(&ack).unwrap())
                            .await;
                    }
                }
                Err(err) => reply_event_error(state, &connection_id, request_id, err).await,
            }
        }
        ClientEvent::UserTyping { task_id, is_typing } => {
            let msg = UserTypingMessage {
                r#type: EventType::UserTyping,
                user_id: identity.user_id.as_uuid(),
                username: identity.username.clone(),
                task_id,
                is_typing,
                timestamp: iso_timestamp(),
            };
            relay_presence(
                state,
                connection_id,
                request_id,
                serde_json::to_string(&msg).unwrap(),
            )
            .await;
        }
        ClientEvent::CursorMove { task_id, x, y } => {
            let msg = CursorMovedMessage {
                r#type: EventType::CursorMoved,
                user_id: identity.user_id.as_uuid(),
                username: identity.username.clone(),
                task_id,
                position: CursorPosition { x, y },
                timestamp: iso_timestamp(),
            };
            relay_presence(
                state,
                connection_id,
                request_id,
                serde_json::to_string(&msg).unwrap(),
            )
            .await;
        }
        ClientEvent::TaskFocus { task_id } => {
            let msg = TaskFocusMessage {
                r#type: EventType::TaskFocused,
                user_id: identity.user_id.as_uuid(),
                username: identity.username.clone(),
                task_id,
                timestamp: iso_timestamp(),
            };
            relay_presence(
                state,
                connection_id,
                request_id,
                serde_json::to_string(&msg).unwrap(),
            )
            .await;
        }
        ClientEvent::TaskBlur { task_id } => {
            let msg = TaskFocusMessage {
                r#type: EventType::TaskBlurred,
                user_id: identity.user_id.as_uuid(),
                username: identity.username.clone(),
                task_id,
                timestamp: iso_timestamp(),
            };
            relay_presence(
                state,
                connection_id,
                request_id,
                serde_json::to_string(&msg).unwrap(),
            )
            .await;
        }
        ClientEvent::Ping => {
            if let Some(request_id) = request_id {
                let ack = PongAck {
                    r#type: EventType::Ack,
                    request_id,
                    success: true,
                    pong: true,
                    server_time: iso_timestamp(),
                };
                reply(state, &connection_id, serde_json::to_string(&ack).unwrap()).await;
            }
        }
        ClientEvent::GetBoardStats { board_id } => {
            match state
                .board_stats_usecase
                .execute(&connection_id, board_id)
                .await
            {
                Ok(stats) => {
                    if let Some(request_id) = request_id {
                        let ack = BoardStatsAck {
                            r#type: EventType::Ack,
                            request_id,
                            success: true,
                            stats: BoardStatsDto {
                                board_id: stats.board_id.as_str().to_string(),
                                connected_users: stats.connected_users,
                                timestamp: iso_timestamp(),
                            },
                        };
                        reply(state, &connection_id, serde_json::to_string(&ack).unwrap())
                            .await;
                    }
                }
                Err(err) => reply_event_error(state, &connection_id, request_id, err).await,
            }
        }
    }
}

async fn handle_join_board(
    state: &Arc<AppState>,
    connection_id: ConnectionId,
    identity: &Identity,
    board_id: Option<String>,
    request_id: Option<String>,
) {
    match state
        .join_board_usecase
        .execute(connection_id, board_id)
        .await
    {
        Ok(outcome) => {
            // Peers of the implicitly left board hear user_left first.
            if let Some(left) = &outcome.left {
                let msg = UserLeftMessage::now(identity.user_id.as_uuid(), &identity.username);
                let payload = serde_json::to_string(&msg).unwrap();
                state
                    .broadcaster
                    .to_targets(left.peers.clone(), &payload)
                    .await;
            }

            let msg = UserJoinedMessage::now(identity.user_id.as_uuid(), &identity.username);
            let payload = serde_json::to_string(&msg).unwrap();
            state
                .broadcaster
                .to_targets(outcome.peers.clone(), &payload)
                .await;

            if let Some(request_id) = request_id {
                let ack = JoinBoardAck {
                    r#type: EventType::Ack,
                    request_id,
                    success: true,
                    board_id: outcome.board_id.as_str().to_string(),
                    users_in_room: outcome.member_count,
                };
                reply(state, &connection_id, serde_json::to_string(&ack).unwrap()).await;
            }
        }
        Err(err) => reply_event_error(state, &connection_id, request_id, err).await,
    }
}

async fn handle_leave_board(
    state: &Arc<AppState>,
    connection_id: ConnectionId,
    identity: &Identity,
    board_id: Option<String>,
    request_id: Option<String>,
) {
    let outcome = state.leave_board_usecase.execute(connection_id).await;

    let left_board = match &outcome {
        Some(outcome) => {
            let msg = UserLeftMessage::now(identity.user_id.as_uuid(), &identity.username);
            let payload = serde_json::to_string(&msg).unwrap();
            state
                .broadcaster
                .to_targets(outcome.peers.clone(), &payload)
                .await;
            outcome.board_id.as_str().to_string()
        }
        // Leaving while unjoined is a no-op, acknowledged as such.
        None => board_id.unwrap_or_default(),
    };

    if let Some(request_id) = request_id {
        let ack = LeaveBoardAck {
            r#type: EventType::Ack,
            request_id,
            success: true,
            board_id: left_board,
        };
        reply(state, &connection_id, serde_json::to_string(&ack).unwrap()).await;
    }
}

async fn relay_presence(
    state: &Arc<AppState>,
    connection_id: ConnectionId,
    request_id: Option<String>,
    payload: String,
) {
    match state.presence_usecase.execute(connection_id, &payload).await {
        Ok(()) => {
            if let Some(request_id) = request_id {
                let ack = PresenceAck {
                    r#type: EventType::Ack,
                    request_id,
                    success: true,
                };
                reply(state, &connection_id, serde_json::to_string(&ack).unwrap()).await;
            }
        }
        Err(err) => reply_event_error(state, &connection_id, request_id, err).await,
    }
}

async fn reply(state: &Arc<AppState>, connection_id: &ConnectionId, payload: String) {
    if let Err(e) = state.pusher.push_to(connection_id, &payload).await {
        tracing::debug!("Failed to reply to '{}': {}", connection_id, e);
    }
}

async fn reply_event_error(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    request_id: Option<String>,
    err: EventError,
) {
    let details = err.details();
    reply_error(state, connection_id, request_id, &err.to_string(), details).await;
}

async fn reply_error(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    request_id: Option<String>,
    error: &str,
    details: Option<Vec<String>>,
) {
    let payload = match request_id {
        Some(request_id) => serde_json::to_string(&AckErrorMessage {
            r#type: EventType::Ack,
            request_id,
            error: error.to_string(),
            details,
        })
        .unwrap(),
        None => serde_json::to_string(&ErrorMessage::new(error, details)).unwrap(),
    };
    reply(state, connection_id, payload).await;
}
