//! UseCase: client connection handshake.
//!
//! Verifies the bearer credential through the external verifier and, on
//! success, records the connection in the registry and wires its outbound
//! channel into the event pusher. A connection that fails here never becomes
//! visible to any room.

use std::sync::Arc;

use crate::{
    domain::{ConnectionId, CredentialVerifier, EventPusher, Identity, PusherChannel},
    infrastructure::registry::ConnectionRegistry,
};

use super::error::ConnectError;

pub struct ConnectClientUseCase {
    verifier: Arc<dyn CredentialVerifier>,
    registry: Arc<ConnectionRegistry>,
    pusher: Arc<dyn EventPusher>,
}

impl ConnectClientUseCase {
    pub fn new(
        verifier: Arc<dyn CredentialVerifier>,
        registry: Arc<ConnectionRegistry>,
        pusher: Arc<dyn EventPusher>,
    ) -> Self {
        Self {
            verifier,
            registry,
            pusher,
        }
    }

    /// Authenticate and register a new connection.
    ///
    /// # Arguments
    ///
    /// * `credential` - Bearer token from the handshake, if any
    /// * `connection_id` - Transport-generated connection id
    /// * `sender` - The connection's outbound channel
    pub async fn execute(
        &self,
        credential: Option<&str>,
        connection_id: ConnectionId,
        sender: PusherChannel,
    ) -> Result<Identity, ConnectError> {
        let credential = credential.ok_or(ConnectError::MissingCredential)?;

        let identity = self.verifier.verify(credential).await?;

        self.registry.register(connection_id, identity.clone()).await;
        self.pusher.register(connection_id, sender).await;

        tracing::info!(
            "Connection '{}' authenticated as '{}'",
            connection_id,
            identity.username
        );

        Ok(identity)
    }
}
