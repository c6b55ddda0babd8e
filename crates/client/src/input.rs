//! Input interpreter
//!
//! Classifies a raw input token into a closed instruction set, then applies
//! the instruction to the puzzle and selection. Applying returns the single
//! outbound message the mutation calls for, if any.

use crossword_web_protocol::GridUpdate;

use crate::cursor::{skip_blocks, Selection};
use crate::puzzle::{Cell, Puzzle};

/// Raw input forwarded by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// `KeyboardEvent.key` value
    Key(String),
    Click(usize),
    DoubleClick(usize),
    /// Dedicated reveal control
    Reveal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrow {
    Left,
    Right,
    Up,
    Down,
}

impl Arrow {
    /// One-step index offset on a board `cols` wide
    pub fn offset(self, cols: usize) -> isize {
        let row = isize::try_from(cols).unwrap_or(isize::MAX);
        match self {
            Self::Left => -1,
            Self::Right => 1,
            Self::Up => -row,
            Self::Down => row,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Letter(char),
    Delete,
    ToggleDirection,
    Move(Arrow),
    Reveal,
    Select(usize),
    SelectAndToggle(usize),
    None,
}

/// Side effect to publish after a local mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Grid channel
    Grid(GridUpdate),
    /// Position channel
    Position(usize),
}

/// Map a raw event onto an instruction
pub fn classify(event: &InputEvent) -> Instruction {
    match event {
        InputEvent::Key(key) => classify_key(key),
        InputEvent::Click(index) => Instruction::Select(*index),
        InputEvent::DoubleClick(index) => Instruction::SelectAndToggle(*index),
        InputEvent::Reveal => Instruction::Reveal,
    }
}

fn classify_key(key: &str) -> Instruction {
    match key {
        "Backspace" | "Delete" => Instruction::Delete,
        " " | "Spacebar" => Instruction::ToggleDirection,
        "ArrowLeft" => Instruction::Move(Arrow::Left),
        "ArrowRight" => Instruction::Move(Arrow::Right),
        "ArrowUp" => Instruction::Move(Arrow::Up),
        "ArrowDown" => Instruction::Move(Arrow::Down),
        _ => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_lowercase() => Instruction::Letter(c),
                _ => Instruction::None,
            }
        }
    }
}

/// Apply one instruction, returning the message to broadcast
pub fn apply(
    puzzle: &mut Puzzle,
    selection: &mut Selection,
    instruction: Instruction,
) -> Option<Outbound> {
    if puzzle.is_empty() {
        return None;
    }
    let cols = puzzle.cols();

    match instruction {
        Instruction::Letter(c) => {
            let index = selection.selected;
            let cell = Cell::Letter(c.to_ascii_uppercase());
            if !puzzle.set_cell(index, cell) {
                return None;
            }
            let stride = isize::try_from(selection.direction.stride(cols)).unwrap_or(isize::MAX);
            selection.selected = skip_blocks(puzzle, index, stride);
            selection.refresh(puzzle);
            Some(Outbound::Grid(GridUpdate::manual(index, cell.to_wire())))
        }
        Instruction::Delete => {
            let index = selection.selected;
            if !puzzle.set_cell(index, Cell::Empty) {
                return None;
            }
            Some(Outbound::Grid(GridUpdate::manual(index, Cell::Empty.to_wire())))
        }
        Instruction::ToggleDirection => {
            selection.toggle_direction(puzzle);
            None
        }
        Instruction::Move(arrow) => {
            selection.selected = skip_blocks(puzzle, selection.selected, arrow.offset(cols));
            selection.refresh(puzzle);
            Some(Outbound::Position(selection.selected))
        }
        Instruction::Reveal => {
            let index = selection.selected;
            let cell = puzzle.reveal(index)?;
            Some(Outbound::Grid(GridUpdate::revealed(index, cell.to_wire())))
        }
        Instruction::Select(index) => {
            if puzzle.is_block(index) {
                return None;
            }
            selection.select(puzzle, index);
            Some(Outbound::Position(index))
        }
        Instruction::SelectAndToggle(index) => {
            if puzzle.is_block(index) {
                return None;
            }
            selection.selected = index;
            selection.toggle_direction(puzzle);
            Some(Outbound::Position(index))
        }
        Instruction::None => None,
    }
}
