//! Cursor & highlight engine
//!
//! Derives the active clue and the highlighted word from the selected cell
//! and direction. Word boundaries come from the grid alone: a walk stops at
//! a block, at the edge of the board, and (across only) at a row edge.

use crate::puzzle::{Clue, Puzzle};

/// Entry direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Across,
    Down,
}

impl Direction {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Across => Self::Down,
            Self::Down => Self::Across,
        }
    }

    /// Index distance between neighbouring cells of a word
    pub const fn stride(self, cols: usize) -> usize {
        match self {
            Self::Across => 1,
            Self::Down => cols,
        }
    }
}

/// Walk back from `selected` to the first cell of its word
pub fn resolve_active_clue_start(puzzle: &Puzzle, selected: usize, direction: Direction) -> usize {
    let cols = puzzle.cols();
    if cols == 0 {
        return selected;
    }
    let stride = direction.stride(cols);

    let mut index = selected;
    loop {
        if direction == Direction::Across && index % cols == 0 {
            break;
        }
        let Some(prev) = index.checked_sub(stride) else {
            break;
        };
        if puzzle.is_block(prev) {
            break;
        }
        index = prev;
    }
    index
}

/// Clue number of the word containing `selected`
pub fn resolve_active_clue(puzzle: &Puzzle, selected: usize, direction: Direction) -> u32 {
    puzzle.number(resolve_active_clue_start(puzzle, selected, direction))
}

/// Every cell of the word starting at `start`, in order
pub fn resolve_highlight_span(puzzle: &Puzzle, start: usize, direction: Direction) -> Vec<usize> {
    let cols = puzzle.cols();
    if cols == 0 || puzzle.is_block(start) {
        return Vec::new();
    }
    let stride = direction.stride(cols);

    let mut span = vec![start];
    let mut index = start;
    loop {
        let next = index + stride;
        if next >= puzzle.len() {
            break;
        }
        // Never wrap into the next row
        if direction == Direction::Across && next % cols == 0 {
            break;
        }
        if puzzle.is_block(next) {
            break;
        }
        span.push(next);
        index = next;
    }
    span
}

/// Step from `from` by `offset` until a fillable cell is reached
///
/// Returns `from` unchanged when the walk leaves the board first.
pub fn skip_blocks(puzzle: &Puzzle, from: usize, offset: isize) -> usize {
    if offset == 0 {
        return from;
    }
    let mut index = from;
    loop {
        let Some(next) = index.checked_add_signed(offset) else {
            return from;
        };
        if next >= puzzle.len() {
            return from;
        }
        if !puzzle.is_block(next) {
            return next;
        }
        index = next;
    }
}

/// Local cursor state plus the cursors of other sessions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub selected: usize,
    pub direction: Direction,
    pub highlighted_clue: u32,
    pub highlighted_cells: Vec<usize>,
    pub remote_cursors: Vec<usize>,
}

impl Selection {
    /// Initial selection for a freshly loaded puzzle: first fillable cell, across
    pub fn for_puzzle(puzzle: &Puzzle) -> Self {
        let selected = if puzzle.is_block(0) {
            skip_blocks(puzzle, 0, 1)
        } else {
            0
        };
        let mut selection = Self {
            selected,
            ..Self::default()
        };
        selection.refresh(puzzle);
        selection
    }

    /// Recompute the active clue and highlight span
    pub fn refresh(&mut self, puzzle: &Puzzle) {
        let start = resolve_active_clue_start(puzzle, self.selected, self.direction);
        self.highlighted_clue = puzzle.number(start);
        self.highlighted_cells = resolve_highlight_span(puzzle, start, self.direction);
    }

    pub fn select(&mut self, puzzle: &Puzzle, index: usize) {
        self.selected = index;
        self.refresh(puzzle);
    }

    pub fn toggle_direction(&mut self, puzzle: &Puzzle) {
        self.direction = self.direction.toggled();
        self.refresh(puzzle);
    }

    /// Clue shown for the current word
    pub fn active_clue<'a>(&self, puzzle: &'a Puzzle) -> Option<&'a Clue> {
        puzzle.clue(self.direction, self.highlighted_clue)
    }

    pub fn is_highlighted(&self, index: usize) -> bool {
        self.highlighted_cells.contains(&index)
    }

    pub fn has_remote_cursor(&self, index: usize) -> bool {
        self.remote_cursors.contains(&index)
    }
}
