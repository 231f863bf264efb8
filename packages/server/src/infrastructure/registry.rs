//! Connection registry: every live connection and its authenticated identity.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, Identity};

/// Bookkeeping for one live connection. The identity is set once at
/// handshake and immutable thereafter.
#[derive(Debug, Clone)]
pub struct ConnectionRecord {
    pub identity: Identity,
    pub connected_at: DateTime<Utc>,
}

/// Tracks every live client connection.
///
/// Connection ids are generated by the transport layer and assumed unique
/// for the registry's lifetime; records are never persisted.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<ConnectionId, ConnectionRecord>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly authenticated connection.
    pub async fn register(&self, connection_id: ConnectionId, identity: Identity) {
        let record = ConnectionRecord {
            identity,
            connected_at: Utc::now(),
        };
        let mut connections = self.connections.lock().await;
        connections.insert(connection_id, record);
    }

    /// Remove a connection, returning its record. Idempotent: a duplicate
    /// disconnect signal finds nothing and returns `None`.
    pub async fn unregister(&self, connection_id: &ConnectionId) -> Option<ConnectionRecord> {
        let mut connections = self.connections.lock().await;
        connections.remove(connection_id)
    }

    pub async fn lookup(&self, connection_id: &ConnectionId) -> Option<ConnectionRecord> {
        let connections = self.connections.lock().await;
        connections.get(connection_id).cloned()
    }

    pub async fn count(&self) -> usize {
        let connections = self.connections.lock().await;
        connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    fn alice() -> Identity {
        Identity::new(UserId::generate(), "alice")
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        // given:
        let registry = ConnectionRegistry::new();
        let connection_id = ConnectionId::generate();
        let identity = alice();

        // when:
        registry.register(connection_id, identity.clone()).await;

        // then:
        let record = registry.lookup(&connection_id).await.unwrap();
        assert_eq!(record.identity, identity);
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        // given:
        let registry = ConnectionRegistry::new();
        let connection_id = ConnectionId::generate();
        registry.register(connection_id, alice()).await;

        // when: first unregister removes, second finds nothing
        let first = registry.unregister(&connection_id).await;
        let second = registry.unregister(&connection_id).await;

        // then:
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn test_lookup_unknown_connection() {
        let registry = ConnectionRegistry::new();
        assert!(registry.lookup(&ConnectionId::generate()).await.is_none());
    }
}
