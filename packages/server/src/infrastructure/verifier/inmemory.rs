//! Static token table verifier.
//!
//! Stand-in for the external authentication service: a fixed map from bearer
//! token to identity, suitable for demos and tests. Real deployments put a
//! JWT or session-store verifier behind the same port.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{AuthError, CredentialVerifier, Identity};

pub struct StaticTokenVerifier {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenVerifier {
    pub fn new(tokens: impl IntoIterator<Item = (String, Identity)>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }
}

#[async_trait]
impl CredentialVerifier for StaticTokenVerifier {
    async fn verify(&self, credential: &str) -> Result<Identity, AuthError> {
        self.tokens
            .get(credential)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    #[tokio::test]
    async fn test_known_token_yields_identity() {
        // given:
        let alice = Identity::new(UserId::generate(), "alice");
        let verifier =
            StaticTokenVerifier::new([("alice-token".to_string(), alice.clone())]);

        // when:
        let verified = verifier.verify("alice-token").await.unwrap();

        // then:
        assert_eq!(verified, alice);
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        let verifier = StaticTokenVerifier::new([]);
        assert_eq!(
            verifier.verify("nope").await,
            Err(AuthError::InvalidToken)
        );
    }
}
