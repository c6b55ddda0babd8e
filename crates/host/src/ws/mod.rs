//! WebSocket endpoint
//!
//! One socket per browser tab, upgraded from `GET /socket` on the HTTP
//! server. The per-connection loop lives in `connection`.

mod connection;

pub use connection::handle_socket;

use axum::{
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
};

use crate::api::AppState;

/// Upgrade handler mounted at [`crossword_web_protocol::SOCKET_PATH`]
pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = handle_socket(socket, state.relay).await {
            tracing::warn!(error = %e, "Connection error");
        }
    })
}
