//! WebSocket-backed event pusher.
//!
//! The ui layer creates one unbounded channel per accepted connection and
//! pumps its receiving end into the WebSocket sink; this implementation
//! manages the sending ends and pushes serialized payloads through them.
//! Because each connection has exactly one channel, events destined to one
//! recipient are delivered in the order they were pushed.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, EventPushError, EventPusher, PusherChannel};

/// Connection id to outbound channel map.
#[derive(Default)]
pub struct WebSocketEventPusher {
    channels: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketEventPusher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventPusher for WebSocketEventPusher {
    async fn register(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut channels = self.channels.lock().await;
        channels.insert(connection_id, sender);
        tracing::debug!("Connection '{}' registered to event pusher", connection_id);
    }

    async fn unregister(&self, connection_id: &ConnectionId) {
        let mut channels = self.channels.lock().await;
        channels.remove(connection_id);
        tracing::debug!(
            "Connection '{}' unregistered from event pusher",
            connection_id
        );
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        payload: &str,
    ) -> Result<(), EventPushError> {
        let channels = self.channels.lock().await;

        if let Some(sender) = channels.get(connection_id) {
            sender
                .send(payload.to_string())
                .map_err(|e| EventPushError::PushFailed(e.to_string()))?;
            Ok(())
        } else {
            Err(EventPushError::ConnectionNotFound(connection_id.to_string()))
        }
    }

    async fn broadcast(&self, targets: Vec<ConnectionId>, payload: &str) {
        let channels = self.channels.lock().await;

        for target in targets {
            match channels.get(&target) {
                Some(sender) => {
                    // A closed receiver means the transport is going away;
                    // disconnect detection will clean the entry up.
                    if let Err(e) = sender.send(payload.to_string()) {
                        tracing::warn!("Failed to push event to connection '{}': {}", target, e);
                    }
                }
                None => {
                    tracing::warn!("Connection '{}' not found during broadcast, skipping", target);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[tokio::test]
    async fn test_push_to_success() {
        // given:
        let pusher = WebSocketEventPusher::new();
        let connection_id = ConnectionId::generate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register(connection_id, tx).await;

        // when:
        let result = pusher.push_to(&connection_id, "hello").await;

        // then:
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("hello".to_string()));
    }

    #[tokio::test]
    async fn test_push_to_unknown_connection() {
        let pusher = WebSocketEventPusher::new();
        let result = pusher.push_to(&ConnectionId::generate(), "hello").await;
        assert!(matches!(
            result.unwrap_err(),
            EventPushError::ConnectionNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_targets() {
        // given:
        let pusher = WebSocketEventPusher::new();
        let c1 = ConnectionId::generate();
        let c2 = ConnectionId::generate();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        pusher.register(c1, tx1).await;
        pusher.register(c2, tx2).await;

        // when:
        pusher.broadcast(vec![c1, c2], "event").await;

        // then:
        assert_eq!(rx1.recv().await, Some("event".to_string()));
        assert_eq!(rx2.recv().await, Some("event".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_tolerates_missing_target() {
        // given: one live target and one never registered
        let pusher = WebSocketEventPusher::new();
        let live = ConnectionId::generate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register(live, tx).await;

        // when:
        pusher
            .broadcast(vec![ConnectionId::generate(), live], "event")
            .await;

        // then: the live target still receives the event
        assert_eq!(rx.recv().await, Some("event".to_string()));
    }

    #[tokio::test]
    async fn test_unregister_drops_channel() {
        // given:
        let pusher = WebSocketEventPusher::new();
        let connection_id = ConnectionId::generate();
        let (tx, _rx) = mpsc::unbounded_channel();
        pusher.register(connection_id, tx).await;

        // when:
        pusher.unregister(&connection_id).await;

        // then:
        assert!(pusher.push_to(&connection_id, "hello").await.is_err());
    }

    #[tokio::test]
    async fn test_per_recipient_order_is_preserved() {
        // given:
        let pusher = WebSocketEventPusher::new();
        let connection_id = ConnectionId::generate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register(connection_id, tx).await;

        // when: a push interleaved with broadcasts
        pusher.broadcast(vec![connection_id], "first").await;
        pusher.push_to(&connection_id, "second").await.unwrap();
        pusher.broadcast(vec![connection_id], "third").await;

        // then: delivered in push order
        assert_eq!(rx.recv().await, Some("first".to_string()));
        assert_eq!(rx.recv().await, Some("second".to_string()));
        assert_eq!(rx.recv().await, Some("third".to_string()));
    }
}
