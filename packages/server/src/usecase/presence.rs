//! UseCase: ephemeral presence relay.
//!
//! Typing, cursor and focus signals are never persisted and never validated
//! beyond shape: they are relayed best-effort to the sender's current board,
//! excluding the sender. A relay failure is invisible to room peers; the
//! only reportable condition is the sender not being joined to any board.

use std::sync::Arc;

use crate::{
    domain::ConnectionId,
    infrastructure::{broadcast::EventBroadcaster, rooms::RoomManager},
};

use super::error::EventError;

pub struct PresenceRelayUseCase {
    rooms: Arc<RoomManager>,
    broadcaster: Arc<EventBroadcaster>,
}

impl PresenceRelayUseCase {
    pub fn new(rooms: Arc<RoomManager>, broadcaster: Arc<EventBroadcaster>) -> Self {
        Self { rooms, broadcaster }
    }

    /// Relay a serialized presence payload to the sender's board peers.
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        payload: &str,
    ) -> Result<(), EventError> {
        let board_id = self
            .rooms
            .board_of(&connection_id)
            .await
            .ok_or(EventError::NotJoined)?;

        self.broadcaster
            .to_board(&board_id, payload, Some(&connection_id))
            .await;
        Ok(())
    }
}
