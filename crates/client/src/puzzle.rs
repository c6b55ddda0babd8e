//! Puzzle model: fixed geometry, live fill grid and reveal set
//!
//! Out-of-range lookups never panic. Geometry lookups report a block and
//! content lookups report an empty cell, which is what lets cursor walks
//! step off the board and stop cleanly.

use std::collections::BTreeSet;

use crossword_web_protocol::{unescape_entities, FillValue, PuzzleDocument, BLOCK_MARKER};

use crate::cursor::Direction;
use crate::{ClientError, Result};

/// Content of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    /// Not part of any word
    Block,
    #[default]
    Empty,
    /// Always stored uppercase
    Letter(char),
}

impl Cell {
    /// Parse a wire value: `"."`, `""`/`" "`, or one ASCII alphanumeric
    pub fn from_wire(raw: &str) -> Option<Self> {
        if raw == BLOCK_MARKER {
            return Some(Self::Block);
        }
        FillValue::parse(raw).map(|value| match value {
            FillValue::Blank => Self::Empty,
            FillValue::Letter(c) => Self::Letter(c),
        })
    }

    pub fn to_wire(self) -> String {
        match self {
            Self::Block => BLOCK_MARKER.to_string(),
            Self::Empty => String::new(),
            Self::Letter(c) => c.to_string(),
        }
    }

    pub const fn is_block(self) -> bool {
        matches!(self, Self::Block)
    }

    pub const fn letter(self) -> Option<char> {
        match self {
            Self::Letter(c) => Some(c),
            _ => None,
        }
    }
}

/// A numbered clue with its text already unescaped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clue {
    pub number: u32,
    pub text: String,
}

impl Clue {
    /// Parse `"<number>.<text>"`; a missing or bad number yields 0
    pub fn parse(raw: &str) -> Self {
        let (number, text) = match raw.split_once('.') {
            Some((num, text)) => match num.trim().parse() {
                Ok(number) => (number, text.trim_start()),
                Err(_) => (0, raw),
            },
            None => (0, raw),
        };
        Self {
            number,
            text: unescape_entities(text),
        }
    }
}

/// Puzzle definition plus the mutable fill state
#[derive(Debug, Clone, Default)]
pub struct Puzzle {
    title: String,
    cols: usize,
    rows: usize,
    across: Vec<Clue>,
    down: Vec<Clue>,
    grid: Vec<Cell>,
    numbers: Vec<u32>,
    answers: Vec<Cell>,
    revealed: Vec<usize>,
}

impl Puzzle {
    /// Build a puzzle from a downloaded document, checking every invariant
    pub fn from_document(doc: &PuzzleDocument) -> Result<Self> {
        let cols = doc.size.cols;
        let rows = doc.size.rows;
        if cols == 0 || rows == 0 {
            return Err(ClientError::InvalidPuzzle(format!("empty size {cols}x{rows}")));
        }
        let len = cols
            .checked_mul(rows)
            .ok_or_else(|| ClientError::InvalidPuzzle(format!("size {cols}x{rows} overflows")))?;

        if doc.grid.len() != len {
            return Err(ClientError::InvalidPuzzle(format!(
                "grid has {} cells, expected {len}",
                doc.grid.len()
            )));
        }
        if doc.gridnums.len() != len {
            return Err(ClientError::InvalidPuzzle(format!(
                "gridnums has {} entries, expected {len}",
                doc.gridnums.len()
            )));
        }
        if !doc.answer_grid.is_empty() && doc.answer_grid.len() != len {
            return Err(ClientError::InvalidPuzzle(format!(
                "answerGrid has {} cells, expected {len}",
                doc.answer_grid.len()
            )));
        }

        let grid = parse_cells(&doc.grid, "grid")?;
        let answers = parse_cells(&doc.answer_grid, "answerGrid")?;

        if let Some(index) = answers
            .iter()
            .zip(&grid)
            .position(|(answer, cell)| answer.is_block() != cell.is_block())
        {
            return Err(ClientError::InvalidPuzzle(format!(
                "block mismatch between grid and answerGrid at {index}"
            )));
        }

        let mut puzzle = Self {
            title: doc.title.clone(),
            cols,
            rows,
            across: doc.clues.across.iter().map(|raw| Clue::parse(raw)).collect(),
            down: doc.clues.down.iter().map(|raw| Clue::parse(raw)).collect(),
            grid,
            numbers: doc.gridnums.clone(),
            answers,
            revealed: Vec::new(),
        };

        // The relay seeds the list with -1; skip anything off the board
        for &raw in &doc.revealed_grid {
            if let Ok(index) = usize::try_from(raw) {
                puzzle.reveal(index);
            }
        }

        Ok(puzzle)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn cols(&self) -> usize {
        self.cols
    }

    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn across(&self) -> &[Clue] {
        &self.across
    }

    pub fn down(&self) -> &[Clue] {
        &self.down
    }

    pub fn cells(&self) -> &[Cell] {
        &self.grid
    }

    /// Live content at `index`, `Empty` when off the board
    pub fn cell(&self, index: usize) -> Cell {
        self.grid.get(index).copied().unwrap_or_default()
    }

    /// Ground truth at `index`, `Empty` when off the board or unknown
    pub fn answer(&self, index: usize) -> Cell {
        self.answers.get(index).copied().unwrap_or_default()
    }

    /// Clue number starting at `index`, 0 when none or off the board
    pub fn number(&self, index: usize) -> u32 {
        self.numbers.get(index).copied().unwrap_or(0)
    }

    /// Off-board cells count as blocks
    pub fn is_block(&self, index: usize) -> bool {
        self.grid.get(index).map_or(true, |cell| cell.is_block())
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.contains(&index)
    }

    pub fn revealed(&self) -> &[usize] {
        &self.revealed
    }

    /// Find a clue by direction and number
    pub fn clue(&self, direction: Direction, number: u32) -> Option<&Clue> {
        let clues = match direction {
            Direction::Across => &self.across,
            Direction::Down => &self.down,
        };
        clues.iter().find(|clue| clue.number == number)
    }

    /// Write a letter or blank into a fillable cell
    ///
    /// Returns `false` without touching the grid when `index` is off the
    /// board, is a block, or `cell` is itself a block.
    pub fn set_cell(&mut self, index: usize, cell: Cell) -> bool {
        if cell.is_block() || self.is_block(index) {
            return false;
        }
        self.grid[index] = cell;
        true
    }

    /// Copy the answer into `index` and record it as revealed
    ///
    /// Repeating a reveal leaves the grid unchanged. Returns the revealed
    /// content, or `None` for blocks, off-board indices and puzzles loaded
    /// without answers.
    pub fn reveal(&mut self, index: usize) -> Option<Cell> {
        if self.is_block(index) || self.answers.is_empty() {
            return None;
        }
        let answer = self.answer(index);
        self.grid[index] = answer;
        if !self.revealed.contains(&index) {
            self.revealed.push(index);
        }
        Some(answer)
    }

    /// Every index whose live content differs from the answer
    ///
    /// A blank cell whose answer is a letter counts as wrong.
    pub fn mismatches(&self) -> BTreeSet<usize> {
        self.grid
            .iter()
            .enumerate()
            .filter(|&(index, cell)| !cell.is_block() && *cell != self.answer(index))
            .map(|(index, _)| index)
            .collect()
    }
}

fn parse_cells(raw: &[String], field: &str) -> Result<Vec<Cell>> {
    raw.iter()
        .enumerate()
        .map(|(index, value)| {
            Cell::from_wire(value).ok_or_else(|| {
                ClientError::InvalidPuzzle(format!("{field}[{index}] has bad value {value:?}"))
            })
        })
        .collect()
}
