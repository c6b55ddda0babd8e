//! HTTP routes for crossword-web
//!
//! Puzzle download, health check and the WebSocket upgrade share one port.

use axum::{extract::State, routing::get, Json, Router};
use tower_http::cors::{Any, CorsLayer};

use crossword_web_protocol::{PuzzleDocument, PUZZLE_PATH, SOCKET_PATH};

use crate::relay::SharedRelay;
use crate::ws;

// Shared state
#[derive(Clone)]
pub struct AppState {
    pub relay: SharedRelay,
}

// Routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(PUZZLE_PATH, get(puzzle))
        .route("/health", get(health_check))
        .route(SOCKET_PATH, get(ws::upgrade))
        .with_state(state)
        .layer(cors)
}

// Handlers

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.relay.session_count().await,
    }))
}

async fn puzzle(State(state): State<AppState>) -> Json<PuzzleDocument> {
    Json(state.relay.document().await)
}
