//! Shared board held by the relay
//!
//! The relay keeps just enough state for late joiners: the live fill, the
//! reveal log and every connected session's cursor. Nothing is persisted.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use serde::Deserialize;

use crossword_web_protocol::{
    FillValue, GridUpdate, PositionBroadcast, PuzzleClues, PuzzleDocument, PuzzleSize,
    UpdateMethod, BLOCK_MARKER,
};

/// Sentinel the reveal log starts with
pub const REVEALED_SEED: i64 = -1;

/// Puzzle as stored on disk: `grid` holds the solution
#[derive(Debug, Deserialize)]
struct SourcePuzzle {
    size: PuzzleSize,
    clues: PuzzleClues,
    grid: Vec<String>,
    gridnums: Vec<u32>,
    title: String,
}

#[derive(Debug, Clone)]
pub struct Board {
    document: PuzzleDocument,
    positions: BTreeMap<String, usize>,
}

impl Board {
    /// Build a fresh board from a source puzzle
    pub fn from_source_json(text: &str) -> Result<Self> {
        let source: SourcePuzzle = serde_json::from_str(text).context("parsing puzzle source")?;

        let len = source
            .size
            .cols
            .checked_mul(source.size.rows)
            .context("puzzle size overflows")?;
        ensure!(len > 0, "puzzle size {}x{} is empty", source.size.cols, source.size.rows);
        ensure!(
            source.grid.len() == len,
            "grid has {} cells, expected {len}",
            source.grid.len()
        );
        ensure!(
            source.gridnums.len() == len,
            "gridnums has {} entries, expected {len}",
            source.gridnums.len()
        );

        let answer_grid = source
            .grid
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                if raw.trim() == BLOCK_MARKER {
                    return Ok(BLOCK_MARKER.to_string());
                }
                match FillValue::parse(raw) {
                    Some(FillValue::Letter(c)) => Ok(c.to_string()),
                    _ => bail!("grid[{index}] has bad answer {raw:?}"),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        let grid = answer_grid
            .iter()
            .map(|c| {
                if c == BLOCK_MARKER {
                    BLOCK_MARKER.to_string()
                } else {
                    " ".to_string()
                }
            })
            .collect();

        Ok(Self {
            document: PuzzleDocument {
                size: source.size,
                clues: source.clues,
                grid,
                gridnums: source.gridnums,
                title: source.title,
                answer_grid,
                revealed_grid: vec![REVEALED_SEED],
            },
            positions: BTreeMap::new(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading puzzle {}", path.display()))?;
        Self::from_source_json(&text)
    }

    /// Snapshot served to clients on download
    pub const fn document(&self) -> &PuzzleDocument {
        &self.document
    }

    pub fn title(&self) -> &str {
        &self.document.title
    }

    fn is_fillable(&self, position: usize) -> bool {
        self.document
            .answer_grid
            .get(position)
            .is_some_and(|cell| cell != BLOCK_MARKER)
    }

    /// Record a grid update before it is forwarded
    ///
    /// Manual updates overwrite the live fill; revealed updates copy the
    /// answer in and are logged once.
    pub fn apply(&mut self, update: &GridUpdate) -> Result<()> {
        let position = update.position;
        if !self.is_fillable(position) {
            bail!("cell {position} is not fillable");
        }

        match update.method {
            UpdateMethod::Manual => {
                self.document.grid[position] = match FillValue::parse(&update.value) {
                    Some(FillValue::Blank) => " ".to_string(),
                    Some(FillValue::Letter(c)) => c.to_string(),
                    None => bail!("bad cell value {:?}", update.value),
                };
            }
            UpdateMethod::Revealed => {
                self.document.grid[position] = self.document.answer_grid[position].clone();
                let logged = i64::try_from(position)?;
                if !self.document.revealed_grid.contains(&logged) {
                    self.document.revealed_grid.push(logged);
                }
            }
        }
        Ok(())
    }

    /// Register a session at the top-left cell
    pub fn join(&mut self, session_id: &str) {
        self.positions.insert(session_id.to_string(), 0);
    }

    pub fn set_position(&mut self, session_id: &str, position: usize) {
        self.positions.insert(session_id.to_string(), position);
    }

    /// Forget a session; returns whether it was known
    pub fn leave(&mut self, session_id: &str) -> bool {
        self.positions.remove(session_id).is_some()
    }

    pub fn session_count(&self) -> usize {
        self.positions.len()
    }

    /// Every session's latest position as parallel arrays
    pub fn positions(&self) -> PositionBroadcast {
        PositionBroadcast::from_entries(
            self.positions
                .iter()
                .map(|(id, position)| (id.as_str(), *position)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"{
        "title": "Mini",
        "size": {"cols": 3, "rows": 3},
        "clues": {"across": ["1.Pet", "3.Canine"], "down": ["2.Limb"]},
        "grid": ["C", "A", "T", ".", "r", ".", "D", "O", "G"],
        "gridnums": [1, 2, 0, 0, 0, 0, 3, 0, 0]
    }"#;

    #[test]
    fn test_fresh_board() {
        let board = Board::from_source_json(SOURCE).unwrap();
        let doc = board.document();
        assert_eq!(doc.grid, vec![" ", " ", " ", ".", " ", ".", " ", " ", " "]);
        assert_eq!(doc.answer_grid[4], "R");
        assert_eq!(doc.revealed_grid, vec![REVEALED_SEED]);
        assert_eq!(board.title(), "Mini");
    }

    #[test]
    fn test_bad_sources() {
        assert!(Board::from_source_json("{}").is_err());
        let unicode = SOURCE.replace(r#""C", "A""#, r#""ß", "A""#);
        assert!(Board::from_source_json(&unicode).is_err());
        let short = SOURCE.replace(
            r#""gridnums": [1, 2, 0, 0, 0, 0, 3, 0, 0]"#,
            r#""gridnums": []"#,
        );
        assert!(Board::from_source_json(&short).is_err());
    }

    #[test]
    fn test_manual_updates() {
        let mut board = Board::from_source_json(SOURCE).unwrap();
        board.apply(&GridUpdate::manual(1, "x")).unwrap();
        assert_eq!(board.document().grid[1], "X");
        board.apply(&GridUpdate::manual(1, "")).unwrap();
        assert_eq!(board.document().grid[1], " ");

        assert!(board.apply(&GridUpdate::manual(3, "X")).is_err());
        assert!(board.apply(&GridUpdate::manual(30, "X")).is_err());
        assert!(board.apply(&GridUpdate::manual(0, "XY")).is_err());
        assert_eq!(board.document().grid[3], ".");
    }

    #[test]
    fn test_non_ascii_values_rejected() {
        let mut board = Board::from_source_json(SOURCE).unwrap();
        assert!(board.apply(&GridUpdate::manual(0, "ß")).is_err());
        assert!(board.apply(&GridUpdate::manual(1, "é")).is_err());
        assert_eq!(board.document().grid[0], " ");

        // The document still decodes for late joiners
        let text = serde_json::to_string(board.document()).unwrap();
        assert!(crossword_web_client::download::decode_puzzle(&text).is_ok());
    }

    #[test]
    fn test_reveal_logged_once() {
        let mut board = Board::from_source_json(SOURCE).unwrap();
        board.apply(&GridUpdate::revealed(6, "D")).unwrap();
        board.apply(&GridUpdate::revealed(6, "D")).unwrap();
        assert_eq!(board.document().revealed_grid, vec![REVEALED_SEED, 6]);
        assert_eq!(board.document().grid[6], "D");
    }

    #[test]
    fn test_positions() {
        let mut board = Board::from_source_json(SOURCE).unwrap();
        board.join("b");
        board.join("a");
        board.set_position("b", 7);
        assert_eq!(
            board.positions(),
            PositionBroadcast::from_entries([("a", 0), ("b", 7)])
        );
        assert!(board.leave("a"));
        assert!(!board.leave("a"));
        assert_eq!(board.session_count(), 1);
        assert_eq!(board.positions().websocket_id, vec!["b"]);
    }

    #[test]
    fn test_document_loads_in_client() {
        let mut board = Board::from_source_json(SOURCE).unwrap();
        board.apply(&GridUpdate::manual(0, "c")).unwrap();
        board.apply(&GridUpdate::revealed(8, "G")).unwrap();

        let text = serde_json::to_string(board.document()).unwrap();
        let doc = PuzzleDocument::from_json(&text).unwrap();
        assert_eq!(doc, *board.document());
    }
}
