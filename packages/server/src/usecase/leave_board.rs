//! UseCase: leaving a board room.

use std::sync::Arc;

use crate::{
    domain::ConnectionId,
    infrastructure::rooms::{LeaveOutcome, RoomManager},
};

pub struct LeaveBoardUseCase {
    rooms: Arc<RoomManager>,
}

impl LeaveBoardUseCase {
    pub fn new(rooms: Arc<RoomManager>) -> Self {
        Self { rooms }
    }

    /// Leave the currently joined board. Leaving while unjoined is a no-op,
    /// not an error.
    pub async fn execute(&self, connection_id: ConnectionId) -> Option<LeaveOutcome> {
        let outcome = self.rooms.leave(&connection_id).await;
        if let Some(outcome) = &outcome {
            tracing::info!(
                "Connection '{}' left board '{}'",
                connection_id,
                outcome.board_id
            );
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BoardId;

    #[tokio::test]
    async fn test_leave_reports_remaining_peers() {
        // given: two members of one board
        let rooms = Arc::new(RoomManager::new());
        let usecase = LeaveBoardUseCase::new(rooms.clone());
        let alice = ConnectionId::generate();
        let bob = ConnectionId::generate();
        let board = BoardId::new("main-board").unwrap();
        rooms.join(alice, board.clone()).await;
        rooms.join(bob, board.clone()).await;

        // when:
        let outcome = usecase.execute(alice).await.unwrap();

        // then:
        assert_eq!(outcome.board_id, board);
        assert_eq!(outcome.peers, vec![bob]);
        assert!(rooms.board_of(&alice).await.is_none());
    }

    #[tokio::test]
    async fn test_leave_when_unjoined_is_noop() {
        let rooms = Arc::new(RoomManager::new());
        let usecase = LeaveBoardUseCase::new(rooms);
        assert!(usecase.execute(ConnectionId::generate()).await.is_none());
    }
}
