//! crossword-web client core
//!
//! The collaborative state machine behind the browser UI: puzzle model,
//! cursor and highlight derivation, input interpretation and the sync layer.
//! Nothing here touches the DOM, so every rule is testable natively with a
//! fake [`transport::Transport`].

pub mod config;
pub mod cursor;
pub mod download;
pub mod input;
pub mod puzzle;
pub mod session;
pub mod sync;
pub mod transport;

pub use config::ClientConfig;
pub use cursor::{Direction, Selection};
pub use input::{InputEvent, Instruction};
pub use puzzle::{Cell, Clue, Puzzle};
pub use session::{ConnectionState, CrosswordSession};
pub use transport::Transport;

use crossword_web_protocol::ProtocolError;

/// Client error type
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid puzzle: {0}")]
    InvalidPuzzle(String),
    #[error("malformed message: {0}")]
    MalformedMessage(String),
    #[error("invalid relay URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unsupported relay URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("not connected to a relay")]
    NotConnected,
}

impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Json(e) => Self::Decode(e),
            ProtocolError::Malformed(msg) => Self::MalformedMessage(msg),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
