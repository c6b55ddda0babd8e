//! Puzzle document served by the relay at [`crate::PUZZLE_PATH`]

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleSize {
    pub cols: usize,
    pub rows: usize,
}

/// Clue lists, each entry formatted as `"<number>.<text>"`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleClues {
    pub across: Vec<String>,
    pub down: Vec<String>,
}

/// The document a client downloads once at startup
///
/// `grid` is the live fill (`"."` for blocks, `""`/`" "` for blanks).
/// `answer_grid` and `revealed_grid` may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleDocument {
    pub size: PuzzleSize,
    pub clues: PuzzleClues,
    pub grid: Vec<String>,
    pub gridnums: Vec<u32>,
    pub title: String,
    #[serde(rename = "answerGrid", default)]
    pub answer_grid: Vec<String>,
    #[serde(rename = "revealedGrid", default)]
    pub revealed_grid: Vec<i64>,
}

impl PuzzleDocument {
    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
