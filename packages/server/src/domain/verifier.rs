//! Credential verifier port.

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{AuthError, Identity};

/// Maps a bearer credential presented at handshake time to a verified user
/// identity. Consumed, not implemented, by the engine; the bundled
/// infrastructure implementation is a static token table for demos and tests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<Identity, AuthError>;
}
