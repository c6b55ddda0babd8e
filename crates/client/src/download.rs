//! Puzzle download

use crossword_web_protocol::PuzzleDocument;

use crate::config::ClientConfig;
use crate::puzzle::Puzzle;
use crate::Result;

/// Decode and validate a puzzle document body
pub fn decode_puzzle(text: &str) -> Result<Puzzle> {
    let doc = PuzzleDocument::from_json(text)?;
    Puzzle::from_document(&doc)
}

/// Fetch the shared puzzle from the configured relay
///
/// Returns the raw document; the caller decides when to swap it in.
pub async fn fetch_document(config: &ClientConfig) -> Result<PuzzleDocument> {
    let url = config.puzzle_url();
    tracing::debug!(%url, "downloading puzzle");

    let response = reqwest::Client::new()
        .get(url)
        .send()
        .await?
        .error_for_status()?;
    let text = response.text().await?;
    Ok(PuzzleDocument::from_json(&text)?)
}
