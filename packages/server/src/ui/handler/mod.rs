//! HTTP and WebSocket request handlers.

mod http;
mod websocket;

pub use http::{get_boards, health_check};
pub use websocket::websocket_handler;
