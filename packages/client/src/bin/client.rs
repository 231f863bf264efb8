//! CLI client for the real-time collaborative task board.
//!
//! Connects to a board server over WebSocket, joins a board and turns slash
//! commands from stdin into task and presence events.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin liveboard-client -- --token alice-token --username alice
//! cargo run --bin liveboard-client -- -t bob-token -n bob --board sprint-42
//! ```

use clap::Parser;

use liveboard_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "liveboard-client")]
#[command(about = "CLI client for the real-time collaborative task board", long_about = None)]
struct Args {
    /// Bearer token presented during the WebSocket handshake
    #[arg(short = 't', long)]
    token: String,

    /// Display name used for the local prompt
    #[arg(short = 'n', long)]
    username: String,

    /// Board to join on connect (server default when omitted)
    #[arg(short = 'b', long)]
    board: Option<String>,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) =
        liveboard_client::runner::run_client(args.url, args.token, args.username, args.board).await
    {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
