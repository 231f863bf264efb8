//! Realtime collaboration engine for the liveboard task board.
//!
//! This crate implements the stateful connection/session/room/broadcast layer
//! that coordinates concurrent clients viewing a shared task board: connection
//! registry, board rooms with membership notifications, per-identity sliding
//! window rate limiting, task event handling (create/update/delete/reorder)
//! and ephemeral presence relay. Durable task storage and credential
//! verification are consumed through ports defined in the domain layer.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
