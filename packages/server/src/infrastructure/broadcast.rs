//! Event broadcaster: room-scoped fan-out.
//!
//! Delivery is fire-and-forget per recipient: a connection whose transport
//! already closed is logged and skipped, and the registry's own disconnect
//! detection cleans it up. No error ever reaches the caller.

use std::sync::Arc;

use crate::domain::{BoardId, ConnectionId, EventPusher};

use super::rooms::RoomManager;

/// Fans a serialized event out to every member of a board, optionally
/// excluding the originator to avoid echo.
pub struct EventBroadcaster {
    rooms: Arc<RoomManager>,
    pusher: Arc<dyn EventPusher>,
}

impl EventBroadcaster {
    pub fn new(rooms: Arc<RoomManager>, pusher: Arc<dyn EventPusher>) -> Self {
        Self { rooms, pusher }
    }

    /// Deliver `payload` to every member of `board_id` except `exclude`.
    pub async fn to_board(
        &self,
        board_id: &BoardId,
        payload: &str,
        exclude: Option<&ConnectionId>,
    ) {
        let targets: Vec<ConnectionId> = self
            .rooms
            .members_of(board_id)
            .await
            .into_iter()
            .filter(|member| Some(member) != exclude)
            .collect();

        if targets.is_empty() {
            return;
        }

        tracing::debug!(
            "Broadcasting to {} member(s) of board '{}'",
            targets.len(),
            board_id
        );
        self.pusher.broadcast(targets, payload).await;
    }

    /// Deliver `payload` to an explicit target list (e.g. the remaining
    /// peers of a board the sender already left).
    pub async fn to_targets(&self, targets: Vec<ConnectionId>, payload: &str) {
        if targets.is_empty() {
            return;
        }
        self.pusher.broadcast(targets, payload).await;
    }
}
