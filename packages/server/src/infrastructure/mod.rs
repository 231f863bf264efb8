//! Infrastructure layer: concrete engine state and port implementations.

pub mod broadcast;
pub mod dto;
pub mod pusher;
pub mod rate_limit;
pub mod registry;
pub mod rooms;
pub mod store;
pub mod verifier;
