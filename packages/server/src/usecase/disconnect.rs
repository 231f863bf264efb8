//! UseCase: connection teardown.
//!
//! Transport close is the sole cancellation signal; this usecase runs once
//! per signal and is idempotent, so a duplicate disconnect for the same
//! connection finds the registry entry already gone and does nothing.

use std::sync::Arc;

use crate::{
    domain::{ConnectionId, EventPusher, Identity},
    infrastructure::{
        registry::ConnectionRegistry,
        rooms::{LeaveOutcome, RoomManager},
    },
};

/// What a disconnect cleaned up: who the connection was, and which board
/// (with remaining peers to notify) it was a member of, if any.
#[derive(Debug, Clone)]
pub struct DisconnectOutcome {
    pub identity: Identity,
    pub left: Option<LeaveOutcome>,
}

pub struct DisconnectClientUseCase {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomManager>,
    pusher: Arc<dyn EventPusher>,
}

impl DisconnectClientUseCase {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        rooms: Arc<RoomManager>,
        pusher: Arc<dyn EventPusher>,
    ) -> Self {
        Self {
            registry,
            rooms,
            pusher,
        }
    }

    /// Tear down a connection. Returns `None` when the connection was
    /// already unregistered (duplicate signal).
    pub async fn execute(&self, connection_id: ConnectionId) -> Option<DisconnectOutcome> {
        let record = self.registry.unregister(&connection_id).await?;
        let left = self.rooms.leave(&connection_id).await;
        self.pusher.unregister(&connection_id).await;

        tracing::info!(
            "Connection '{}' ('{}') disconnected",
            connection_id,
            record.identity.username
        );

        Some(DisconnectOutcome {
            identity: record.identity,
            left,
        })
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        domain::{BoardId, UserId},
        infrastructure::pusher::WebSocketEventPusher,
    };

    async fn connected(
        registry: &ConnectionRegistry,
        pusher: &WebSocketEventPusher,
        username: &str,
    ) -> ConnectionId {
        let connection_id = ConnectionId::generate();
        let (tx, _rx) = mpsc::unbounded_channel();
        registry
            .register(connection_id, Identity::new(UserId::generate(), username))
            .await;
        pusher.register(connection_id, tx).await;
        connection_id
    }

    #[tokio::test]
    async fn test_disconnect_leaves_board_and_reports_peers() {
        // given: alice and bob in the same board
        let registry = Arc::new(ConnectionRegistry::new());
        let rooms = Arc::new(RoomManager::new());
        let pusher = Arc::new(WebSocketEventPusher::new());
        let usecase =
            DisconnectClientUseCase::new(registry.clone(), rooms.clone(), pusher.clone());
        let alice = connected(&registry, &pusher, "alice").await;
        let bob = connected(&registry, &pusher, "bob").await;
        let board = BoardId::new("main-board").unwrap();
        rooms.join(alice, board.clone()).await;
        rooms.join(bob, board.clone()).await;

        // when:
        let outcome = usecase.execute(alice).await.unwrap();

        // then: bob is the sole remaining peer and alice is fully removed
        assert_eq!(outcome.identity.username, "alice");
        let left = outcome.left.unwrap();
        assert_eq!(left.board_id, board);
        assert_eq!(left.peers, vec![bob]);
        assert!(registry.lookup(&alice).await.is_none());
        assert_eq!(rooms.members_of(&board).await, vec![bob]);
    }

    #[tokio::test]
    async fn test_duplicate_disconnect_is_noop() {
        // given: a connected client
        let registry = Arc::new(ConnectionRegistry::new());
        let rooms = Arc::new(RoomManager::new());
        let pusher = Arc::new(WebSocketEventPusher::new());
        let usecase =
            DisconnectClientUseCase::new(registry.clone(), rooms.clone(), pusher.clone());
        let alice = connected(&registry, &pusher, "alice").await;

        // when: two disconnect signals arrive for the same connection
        let first = usecase.execute(alice).await;
        let second = usecase.execute(alice).await;

        // then: only the first performs any cleanup
        assert!(first.is_some());
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_disconnect_without_board_membership() {
        // given: a client that never joined a board
        let registry = Arc::new(ConnectionRegistry::new());
        let rooms = Arc::new(RoomManager::new());
        let pusher = Arc::new(WebSocketEventPusher::new());
        let usecase =
            DisconnectClientUseCase::new(registry.clone(), rooms.clone(), pusher.clone());
        let alice = connected(&registry, &pusher, "alice").await;

        // when:
        let outcome = usecase.execute(alice).await.unwrap();

        // then:
        assert!(outcome.left.is_none());
    }
}
