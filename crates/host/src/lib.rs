// crossword-web-host library
// Relay server for a shared crossword using axum and tokio

// Shared puzzle state
pub mod board;
pub mod relay;

// WebSocket endpoint
pub mod ws;

// HTTP routes
pub mod api;

// Configuration
pub mod config;

use std::future::Future;

use tokio::net::TcpListener;

pub use api::{router, AppState};
pub use board::Board;
pub use relay::{Relay, SharedRelay};

/// Puzzle served when no source file is configured
pub const BUNDLED_PUZZLE: &str = include_str!("../puzzles/heart.json");

/// Serve HTTP and WebSocket traffic on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, relay: SharedRelay, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(AppState { relay });
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
