//! Outbound event push port.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, EventPushError};

/// Per-connection outbound channel. Unbounded so pushes never block an event
/// handler; per-recipient delivery order is the channel's FIFO order.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Delivers serialized events to live connections.
///
/// The WebSocket plumbing that created each channel lives in the ui layer;
/// implementations of this trait only manage the senders and push payloads
/// through them.
#[async_trait]
pub trait EventPusher: Send + Sync {
    /// Register the outbound channel for a newly connected client.
    async fn register(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// Remove a connection's channel. No-op if already removed.
    async fn unregister(&self, connection_id: &ConnectionId);

    /// Push a payload to a single connection.
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        payload: &str,
    ) -> Result<(), EventPushError>;

    /// Push a payload to every target, best effort: a failed or missing
    /// recipient is logged and skipped, never reported to the caller.
    async fn broadcast(&self, targets: Vec<ConnectionId>, payload: &str);
}
