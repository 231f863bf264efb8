//! HTTP/WebSocket server assembly.

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::ui::{
    handler::{get_boards, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

pub struct Server {
    host: String,
    port: u16,
    state: Arc<AppState>,
}

impl Server {
    pub fn new(host: String, port: u16, state: Arc<AppState>) -> Self {
        Self { host, port, state }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/ws", get(websocket_handler))
            .route("/api/health", get(health_check))
            .route("/api/boards", get(get_boards))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    pub async fn run(&self) -> Result<(), std::io::Error> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}
