//! Domain layer: value objects, entities and the ports the engine consumes.
//!
//! The traits defined here are implemented by the infrastructure layer
//! (dependency inversion): the usecase layer depends on these interfaces and
//! never on a concrete store, verifier or transport.

mod error;
mod model;
mod pusher;
mod store;
mod verifier;

pub use error::{AuthError, EventPushError, TaskStoreError};
pub use model::{
    BoardId, ConnectionId, Identity, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN, Task, TaskDraft, TaskId,
    TaskPatch, TaskStatus, UserId,
};
pub use pusher::{EventPusher, PusherChannel};
pub use store::TaskStore;
pub use verifier::CredentialVerifier;

#[cfg(test)]
pub use store::MockTaskStore;
#[cfg(test)]
pub use verifier::MockCredentialVerifier;
