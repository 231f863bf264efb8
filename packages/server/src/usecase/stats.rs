//! UseCase: board statistics snapshot.

use std::sync::Arc;

use crate::{
    domain::{BoardId, ConnectionId},
    infrastructure::rooms::RoomManager,
};

use super::error::EventError;

/// Point-in-time view of one board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardStats {
    pub board_id: BoardId,
    pub connected_users: usize,
}

pub struct BoardStatsUseCase {
    rooms: Arc<RoomManager>,
    default_board: BoardId,
}

impl BoardStatsUseCase {
    pub fn new(rooms: Arc<RoomManager>, default_board: BoardId) -> Self {
        Self {
            rooms,
            default_board,
        }
    }

    /// Stats for the named board, the sender's current board, or the
    /// configured default, in that order of preference.
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        board_id: Option<String>,
    ) -> Result<BoardStats, EventError> {
        let board_id = match board_id {
            Some(raw) => BoardId::new(raw).map_err(|e| EventError::Validation(vec![e]))?,
            None => self
                .rooms
                .board_of(connection_id)
                .await
                .unwrap_or_else(|| self.default_board.clone()),
        };

        let connected_users = self.rooms.members_of(&board_id).await.len();
        Ok(BoardStats {
            board_id,
            connected_users,
        })
    }
}
