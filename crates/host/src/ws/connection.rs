//! WebSocket connection handling
//!
//! Assigns the session identity, then runs two halves until either ends:
//! a forwarding task draining the relay broadcast into the socket, and a
//! receive loop feeding client frames to the relay.

use anyhow::Result;
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crossword_web_protocol::Frame;

use crate::relay::SharedRelay;

/// Handle a single WebSocket connection
pub async fn handle_socket(socket: WebSocket, relay: SharedRelay) -> Result<()> {
    let session_id = Uuid::new_v4().to_string();
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Subscribe first so the join announcement reaches this socket too
    let mut events = relay.subscribe();
    ws_tx
        .send(Message::Text(Frame::AssignId(session_id.clone()).to_text()?))
        .await?;
    relay.join(&session_id).await?;

    let forward_id = session_id.clone();
    let mut forward = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(outgoing) => {
                    if !outgoing.audience.includes(&forward_id) {
                        continue;
                    }
                    if ws_tx
                        .send(Message::Text(outgoing.text.to_string()))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        session_id = %forward_id,
                        skipped,
                        "Session lagging, frames dropped"
                    );
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let receive = async {
        while let Some(message) = ws_rx.next().await {
            let message = match message {
                Ok(message) => message,
                Err(e) => {
                    tracing::debug!(session_id = %session_id, error = %e, "Socket read failed");
                    break;
                }
            };
            match message {
                Message::Text(text) => match Frame::from_text(&text) {
                    Ok(frame) => {
                        if let Err(e) = relay.handle_frame(&session_id, frame).await {
                            tracing::warn!(session_id = %session_id, error = %e, "Dropping frame");
                        }
                    }
                    Err(e) => {
                        tracing::warn!(session_id = %session_id, error = %e, "Malformed frame");
                    }
                },
                Message::Close(_) => break,
                // Pings are answered by the socket itself
                _ => {}
            }
        }
    };

    tokio::select! {
        _ = &mut forward => {}
        () = receive => {}
    }
    forward.abort();

    relay.leave(&session_id).await
}
