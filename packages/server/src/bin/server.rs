//! Real-time collaborative task board server.
//!
//! Accepts WebSocket connections, routes board/task/presence events between
//! clients, and exposes a small HTTP API for health and board listings.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin liveboard-server
//! cargo run --bin liveboard-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;

use liveboard_server::{
    domain::{BoardId, Identity, UserId},
    infrastructure::{
        broadcast::EventBroadcaster, pusher::websocket::WebSocketEventPusher,
        rate_limit::{RateLimiterConfig, SlidingWindowLimiter}, registry::ConnectionRegistry,
        rooms::RoomManager, store::inmemory::InMemoryTaskStore,
        verifier::inmemory::StaticTokenVerifier,
    },
    ui::{Server, state::AppState},
    usecase::{
        BoardStatsUseCase, ConnectClientUseCase, DisconnectClientUseCase, JoinBoardUseCase,
        LeaveBoardUseCase, PresenceRelayUseCase, TaskEventUseCase,
    },
};
use liveboard_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "liveboard-server")]
#[command(about = "Real-time collaborative task board server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Board that clients land on when they join without naming one
    #[arg(long, default_value = "main-board")]
    default_board: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    let default_board = match BoardId::new(&args.default_board) {
        Ok(board_id) => board_id,
        Err(e) => {
            tracing::error!("Invalid default board id: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize dependencies in order:
    // 1. Infrastructure (store, verifier, pusher, rooms, registry, limiter)
    // 2. Broadcaster
    // 3. UseCases
    // 4. AppState
    // 5. Server

    // 1. Infrastructure
    let store = Arc::new(InMemoryTaskStore::new());
    let verifier = Arc::new(StaticTokenVerifier::new(demo_tokens()));
    let pusher = Arc::new(WebSocketEventPusher::new());
    let rooms = Arc::new(RoomManager::new());
    let registry = Arc::new(ConnectionRegistry::new());
    let limiter = Arc::new(SlidingWindowLimiter::new(RateLimiterConfig::default()));

    // 2. Broadcaster
    let broadcaster = Arc::new(EventBroadcaster::new(rooms.clone(), pusher.clone()));

    // 3. UseCases
    let connect_usecase = Arc::new(ConnectClientUseCase::new(
        verifier.clone(),
        registry.clone(),
        pusher.clone(),
    ));
    let disconnect_usecase = Arc::new(DisconnectClientUseCase::new(
        registry.clone(),
        rooms.clone(),
        pusher.clone(),
    ));
    let join_board_usecase = Arc::new(JoinBoardUseCase::new(
        rooms.clone(),
        default_board.clone(),
    ));
    let leave_board_usecase = Arc::new(LeaveBoardUseCase::new(rooms.clone()));
    let task_events_usecase = Arc::new(TaskEventUseCase::new(rooms.clone(), store.clone()));
    let presence_usecase = Arc::new(PresenceRelayUseCase::new(
        rooms.clone(),
        broadcaster.clone(),
    ));
    let board_stats_usecase = Arc::new(BoardStatsUseCase::new(rooms.clone(), default_board));

    // 4. AppState
    let state = Arc::new(AppState {
        connect_usecase,
        disconnect_usecase,
        join_board_usecase,
        leave_board_usecase,
        task_events_usecase,
        presence_usecase,
        board_stats_usecase,
        broadcaster,
        pusher,
        limiter,
        registry,
        rooms,
    });

    // 5. Create and run the server
    let server = Server::new(args.host, args.port, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Demo credentials for local development.
fn demo_tokens() -> Vec<(String, Identity)> {
    let tokens = vec![
        (
            "alice-token".to_string(),
            Identity::new(UserId::generate(), "alice"),
        ),
        (
            "bob-token".to_string(),
            Identity::new(UserId::generate(), "bob"),
        ),
    ];
    for (token, identity) in &tokens {
        tracing::info!("Demo token '{}' maps to user '{}'", token, identity.username);
    }
    tokens
}
