//! Shared protocol types for crossword-web
//!
//! Defines the JSON frames exchanged between the relay host and browser
//! clients, and the puzzle document served at startup.

pub mod entities;
pub mod fill;
pub mod messages;
pub mod puzzle;

pub use entities::unescape_entities;
pub use fill::FillValue;
pub use messages::*;
pub use puzzle::*;

/// Wire marker for a block cell
pub const BLOCK_MARKER: &str = ".";

/// Resource path of the puzzle document, relative to the relay base URL
pub const PUZZLE_PATH: &str = "/crossword";

/// Resource path of the relay WebSocket, relative to the relay base URL
pub const SOCKET_PATH: &str = "/socket";

/// Errors produced while decoding wire data
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed frame: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
