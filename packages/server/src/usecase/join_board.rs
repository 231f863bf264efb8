//! UseCase: joining a board room.

use std::sync::Arc;

use crate::{
    domain::{BoardId, ConnectionId},
    infrastructure::rooms::{JoinOutcome, RoomManager},
};

use super::error::EventError;

pub struct JoinBoardUseCase {
    rooms: Arc<RoomManager>,
    default_board: BoardId,
}

impl JoinBoardUseCase {
    pub fn new(rooms: Arc<RoomManager>, default_board: BoardId) -> Self {
        Self {
            rooms,
            default_board,
        }
    }

    /// Join the named board, falling back to the configured default when the
    /// client supplied none. A previously joined different board is left
    /// implicitly; the outcome carries the peers of both boards so the
    /// caller can emit `user_left` and `user_joined` notifications.
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        board_id: Option<String>,
    ) -> Result<JoinOutcome, EventError> {
        let board_id = match board_id {
            Some(raw) => BoardId::new(raw).map_err(|e| EventError::Validation(vec![e]))?,
            None => self.default_board.clone(),
        };

        let outcome = self.rooms.join(connection_id, board_id).await;
        tracing::info!(
            "Connection '{}' joined board '{}' ({} member(s))",
            connection_id,
            outcome.board_id,
            outcome.member_count
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usecase() -> (JoinBoardUseCase, Arc<RoomManager>) {
        let rooms = Arc::new(RoomManager::new());
        let default_board = BoardId::new("main-board").unwrap();
        (JoinBoardUseCase::new(rooms.clone(), default_board), rooms)
    }

    #[tokio::test]
    async fn test_join_falls_back_to_default_board() {
        // given:
        let (usecase, rooms) = usecase();
        let connection_id = ConnectionId::generate();

        // when: no board id supplied
        let outcome = usecase.execute(connection_id, None).await.unwrap();

        // then:
        assert_eq!(outcome.board_id.as_str(), "main-board");
        assert_eq!(
            rooms.board_of(&connection_id).await.unwrap().as_str(),
            "main-board"
        );
    }

    #[tokio::test]
    async fn test_join_explicit_board() {
        let (usecase, _rooms) = usecase();
        let outcome = usecase
            .execute(ConnectionId::generate(), Some("sprint-42".to_string()))
            .await
            .unwrap();
        assert_eq!(outcome.board_id.as_str(), "sprint-42");
    }

    #[tokio::test]
    async fn test_join_rejects_blank_board_id() {
        let (usecase, _rooms) = usecase();
        let result = usecase
            .execute(ConnectionId::generate(), Some("   ".to_string()))
            .await;
        assert!(matches!(result, Err(EventError::Validation(_))));
    }
}
