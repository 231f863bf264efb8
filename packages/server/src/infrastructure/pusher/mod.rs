//! Implementations of the outbound event push port.

pub mod websocket;

pub use websocket::WebSocketEventPusher;
