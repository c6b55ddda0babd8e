//! Relay hub
//!
//! Holds the shared board and fans frames out to every connected session
//! through one broadcast channel. Each connection filters the stream by
//! audience, so the sender can be excluded without per-peer channels.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{broadcast, RwLock};

use crossword_web_protocol::{Frame, PuzzleDocument};

use crate::board::Board;

/// Who should receive an outgoing frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    Everyone,
    Except(String),
}

impl Audience {
    pub fn includes(&self, session_id: &str) -> bool {
        match self {
            Self::Everyone => true,
            Self::Except(excluded) => excluded != session_id,
        }
    }
}

/// A serialized frame plus its audience
#[derive(Debug, Clone)]
pub struct Outgoing {
    pub audience: Audience,
    pub text: Arc<str>,
}

pub type SharedRelay = Arc<Relay>;

#[derive(Debug)]
pub struct Relay {
    board: RwLock<Board>,
    events: broadcast::Sender<Outgoing>,
}

impl Relay {
    pub fn new(board: Board) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            board: RwLock::new(board),
            events,
        }
    }

    pub fn shared(board: Board) -> SharedRelay {
        Arc::new(Self::new(board))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Outgoing> {
        self.events.subscribe()
    }

    /// Current download document
    pub async fn document(&self) -> PuzzleDocument {
        self.board.read().await.document().clone()
    }

    pub async fn session_count(&self) -> usize {
        self.board.read().await.session_count()
    }

    /// Register a new session and announce the cursor set
    pub async fn join(&self, session_id: &str) -> Result<()> {
        let positions = {
            let mut board = self.board.write().await;
            board.join(session_id);
            board.positions()
        };
        tracing::info!(session_id = %session_id, "session joined");
        self.publish(Audience::Everyone, &Frame::ServerPositionUpdate(positions))
    }

    /// Handle one frame from `sender`
    ///
    /// Only client frames are accepted. Invalid grid updates are not
    /// forwarded.
    pub async fn handle_frame(&self, sender: &str, frame: Frame) -> Result<()> {
        match frame {
            Frame::ClientGridUpdate(update) => {
                self.board.write().await.apply(&update)?;
                tracing::debug!(
                    session_id = %sender,
                    position = update.position,
                    method = ?update.method,
                    "grid update"
                );
                self.publish(
                    Audience::Except(sender.to_string()),
                    &Frame::ServerGridUpdate(update),
                )
            }
            Frame::ClientPositionUpdate(update) => {
                let positions = {
                    let mut board = self.board.write().await;
                    board.set_position(sender, update.position);
                    board.positions()
                };
                self.publish(Audience::Everyone, &Frame::ServerPositionUpdate(positions))
            }
            other => anyhow::bail!("{} is not a client frame", other.event_name()),
        }
    }

    /// Drop a session and tell the others
    pub async fn leave(&self, session_id: &str) -> Result<()> {
        let positions = {
            let mut board = self.board.write().await;
            if !board.leave(session_id) {
                return Ok(());
            }
            board.positions()
        };
        tracing::info!(session_id = %session_id, "session left");
        self.publish(
            Audience::Except(session_id.to_string()),
            &Frame::ServerPositionUpdate(positions),
        )
    }

    fn publish(&self, audience: Audience, frame: &Frame) -> Result<()> {
        let text: Arc<str> = frame.to_text()?.into();
        // No receivers just means nobody is connected
        let _ = self.events.send(Outgoing { audience, text });
        Ok(())
    }
}
