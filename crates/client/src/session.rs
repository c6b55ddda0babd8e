//! Session controller
//!
//! Owns the puzzle, selection, identity and transport for one browser tab.
//! Local edits are applied first and broadcast after; a failed send is
//! logged and never rolls back local state.

use std::collections::BTreeSet;

use crossword_web_protocol::{Frame, PuzzleDocument};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::cursor::Selection;
use crate::input::{self, InputEvent, Instruction};
use crate::puzzle::Puzzle;
use crate::sync::{self, Inbound};
use crate::transport::Transport;
use crate::{ClientError, Result};

/// Puzzle lifecycle as seen by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No puzzle yet; every input is ignored
    #[default]
    Disconnected,
    Downloading,
    /// Puzzle loaded and shared
    Connected,
}

pub struct CrosswordSession<T: Transport> {
    config: ClientConfig,
    transport: T,
    puzzle: Puzzle,
    selection: Selection,
    identity: Option<String>,
    state: ConnectionState,
    show_wrong: bool,
    wrong: BTreeSet<usize>,
}

impl<T: Transport> CrosswordSession<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            puzzle: Puzzle::default(),
            selection: Selection::default(),
            identity: None,
            state: ConnectionState::Disconnected,
            show_wrong: false,
            wrong: BTreeSet::new(),
        }
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Swap in a new connection, e.g. after the relay URL changed
    ///
    /// The old identity belongs to the old connection and is forgotten.
    pub fn replace_transport(&mut self, transport: T) -> T {
        self.identity = None;
        self.selection.remote_cursors.clear();
        std::mem::replace(&mut self.transport, transport)
    }

    pub const fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    pub const fn show_wrong(&self) -> bool {
        self.show_wrong
    }

    /// Cells to flag as wrong; always empty while the toggle is off
    pub const fn wrong_cells(&self) -> &BTreeSet<usize> {
        &self.wrong
    }

    pub fn begin_download(&mut self) {
        self.state = ConnectionState::Downloading;
    }

    /// Replace the puzzle wholesale with a freshly downloaded document
    ///
    /// On error the previous puzzle (if any) stays in place.
    pub fn load_document(&mut self, doc: &PuzzleDocument) -> Result<()> {
        let puzzle = match Puzzle::from_document(doc) {
            Ok(puzzle) => puzzle,
            Err(err) => {
                self.download_failed(&err);
                return Err(err);
            }
        };
        info!(
            title = puzzle.title(),
            cols = puzzle.cols(),
            rows = puzzle.rows(),
            "puzzle loaded"
        );
        let remote = std::mem::take(&mut self.selection.remote_cursors);
        self.selection = Selection::for_puzzle(&puzzle);
        self.selection.remote_cursors = remote;
        self.puzzle = puzzle;
        self.state = ConnectionState::Connected;
        self.refresh_wrong();
        Ok(())
    }

    /// Decode and load a document body
    pub fn load_json(&mut self, text: &str) -> Result<()> {
        match PuzzleDocument::from_json(text) {
            Ok(doc) => self.load_document(&doc),
            Err(err) => {
                let err = ClientError::from(err);
                self.download_failed(&err);
                Err(err)
            }
        }
    }

    pub fn download_failed(&mut self, err: &ClientError) {
        warn!(error = %err, "puzzle download failed");
        self.state = if self.puzzle.is_empty() {
            ConnectionState::Disconnected
        } else {
            ConnectionState::Connected
        };
    }

    /// Interpret one raw input event
    ///
    /// Returns the instruction it mapped to so the caller can decide whether
    /// to re-render and suppress the browser default.
    pub fn handle_input(&mut self, event: &InputEvent) -> Instruction {
        let instruction = input::classify(event);
        if instruction == Instruction::None || self.state != ConnectionState::Connected {
            return Instruction::None;
        }

        if let Some(outbound) = input::apply(&mut self.puzzle, &mut self.selection, instruction) {
            self.refresh_wrong();
            if let Err(err) = sync::emit(&mut self.transport, outbound) {
                warn!(error = %err, "broadcast failed; keeping local edit");
            }
        }
        instruction
    }

    /// Apply a frame received from the relay
    pub fn handle_frame(&mut self, frame: Frame) -> Result<()> {
        match Inbound::try_from(frame)? {
            Inbound::Identity(id) => {
                debug!(%id, "identity assigned");
                self.identity = Some(id);
            }
            Inbound::Grid(update) => {
                if self.puzzle.is_empty() {
                    return Err(ClientError::MalformedMessage(
                        "grid update before puzzle load".to_string(),
                    ));
                }
                sync::apply_grid_update(&mut self.puzzle, &update)?;
                self.refresh_wrong();
            }
            Inbound::Positions(broadcast) => {
                sync::apply_position_broadcast(
                    &mut self.selection,
                    &broadcast,
                    self.identity.as_deref(),
                )?;
            }
        }
        Ok(())
    }

    /// Decode and apply a text frame, discarding anything malformed
    ///
    /// Returns whether local state changed.
    pub fn handle_text(&mut self, text: &str) -> bool {
        let result = Frame::from_text(text)
            .map_err(ClientError::from)
            .and_then(|frame| self.handle_frame(frame));
        match result {
            Ok(()) => true,
            Err(err) => {
                debug!(error = %err, "discarding inbound frame");
                false
            }
        }
    }

    pub fn set_show_wrong(&mut self, on: bool) {
        self.show_wrong = on;
        self.refresh_wrong();
    }

    pub fn toggle_show_wrong(&mut self) {
        self.set_show_wrong(!self.show_wrong);
    }

    fn refresh_wrong(&mut self) {
        self.wrong = if self.show_wrong {
            self.puzzle.mismatches()
        } else {
            BTreeSet::new()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::tests::document;
    use crate::puzzle::Cell;
    use crate::transport::MemoryTransport;
    use crossword_web_protocol::{GridUpdate, PositionBroadcast, PositionUpdate};

    fn session(
        answers: &str,
        cols: usize,
        rows: usize,
    ) -> (CrosswordSession<MemoryTransport>, MemoryTransport) {
        let transport = MemoryTransport::new();
        let mut session = CrosswordSession::new(ClientConfig::default(), transport.clone());
        session.load_document(&document(cols, rows, answers)).unwrap();
        (session, transport)
    }

    fn key(name: &str) -> InputEvent {
        InputEvent::Key(name.to_string())
    }

    #[test]
    fn test_input_ignored_before_load() {
        let transport = MemoryTransport::new();
        let mut session = CrosswordSession::new(ClientConfig::default(), transport.clone());
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert_eq!(session.handle_input(&key("a")), Instruction::None);
        assert_eq!(session.handle_input(&InputEvent::Click(0)), Instruction::None);
        assert!(transport.drain().is_empty());
        assert!(!session.handle_text(
            &Frame::ServerGridUpdate(GridUpdate::manual(0, "A")).to_text().unwrap()
        ));
    }

    #[test]
    fn test_letter_broadcasts_grid_only() {
        let (mut session, transport) = session("CAT", 3, 1);
        session.handle_input(&key("c"));
        assert_eq!(session.puzzle().cell(0), Cell::Letter('C'));
        assert_eq!(session.selection().selected, 1);
        assert_eq!(
            transport.drain(),
            vec![Frame::ClientGridUpdate(GridUpdate::manual(0, "C"))]
        );
    }

    #[test]
    fn test_arrow_and_click_broadcast_position() {
        let (mut session, transport) = session("CAT", 3, 1);
        session.handle_input(&key("ArrowRight"));
        session.handle_input(&InputEvent::Click(2));
        assert_eq!(
            transport.drain(),
            vec![
                Frame::ClientPositionUpdate(PositionUpdate { position: 1 }),
                Frame::ClientPositionUpdate(PositionUpdate { position: 2 }),
            ]
        );
    }

    #[test]
    fn test_send_failure_keeps_local_edit() {
        let (mut session, transport) = session("CAT", 3, 1);
        transport.set_connected(false);
        session.handle_input(&key("x"));
        assert_eq!(session.puzzle().cell(0), Cell::Letter('X'));
        assert!(transport.drain().is_empty());
    }

    #[test]
    fn test_remote_edit_touches_one_cell() {
        let (mut session, _) = session("CAT#O#DOG", 3, 3);
        let before = session.puzzle().cells().to_vec();
        let text = Frame::ServerGridUpdate(GridUpdate::manual(4, "o"))
            .to_text()
            .unwrap();
        assert!(session.handle_text(&text));
        for (index, cell) in session.puzzle().cells().iter().enumerate() {
            if index == 4 {
                assert_eq!(*cell, Cell::Letter('O'));
            } else {
                assert_eq!(*cell, before[index]);
            }
        }
    }

    #[test]
    fn test_malformed_frames_discarded() {
        let (mut session, _) = session("CAT", 3, 1);
        let before = session.puzzle().cells().to_vec();
        assert!(!session.handle_text("garbage"));
        assert!(!session.handle_text(r#"{"event":"serverGridUpdate","data":{"position":"x"}}"#));
        assert!(!session.handle_text(
            &Frame::ServerGridUpdate(GridUpdate::manual(99, "A")).to_text().unwrap()
        ));
        assert_eq!(session.puzzle().cells(), before.as_slice());
    }

    #[test]
    fn test_identity_filters_own_cursor() {
        let (mut session, _) = session("CAT", 3, 1);
        session.handle_frame(Frame::AssignId("me".to_string())).unwrap();
        assert_eq!(session.identity(), Some("me"));
        let broadcast = PositionBroadcast::from_entries([("me", 0), ("you", 2)]);
        session
            .handle_frame(Frame::ServerPositionUpdate(broadcast))
            .unwrap();
        assert_eq!(session.selection().remote_cursors, vec![2]);
    }

    #[test]
    fn test_show_wrong_recomputes_fresh() {
        let (mut session, _) = session("CAT", 3, 1);
        session.handle_input(&key("c"));
        session.handle_input(&key("x"));
        session.set_show_wrong(true);
        assert_eq!(session.wrong_cells(), &BTreeSet::from([1, 2]));

        session.toggle_show_wrong();
        assert!(session.wrong_cells().is_empty());

        // Fix cell 1 while hidden; nothing stale survives the next toggle
        session.handle_input(&InputEvent::Click(1));
        session.handle_input(&key("a"));
        session.handle_input(&key("t"));
        session.toggle_show_wrong();
        assert!(session.wrong_cells().is_empty());
    }

    #[test]
    fn test_show_wrong_tracks_remote_edits() {
        let (mut session, _) = session("CAT", 3, 1);
        session.set_show_wrong(true);
        assert_eq!(session.wrong_cells().len(), 3);
        session
            .handle_frame(Frame::ServerGridUpdate(GridUpdate::revealed(0, "C")))
            .unwrap();
        assert_eq!(session.wrong_cells(), &BTreeSet::from([1, 2]));
    }

    #[test]
    fn test_failed_reload_keeps_puzzle() {
        let (mut session, _) = session("CAT", 3, 1);
        session.handle_input(&key("c"));
        session.begin_download();
        assert!(session.load_json("{").is_err());
        assert_eq!(session.state(), ConnectionState::Connected);
        assert_eq!(session.puzzle().cell(0), Cell::Letter('C'));
    }

    #[test]
    fn test_reload_replaces_wholesale() {
        let (mut session, _) = session("CAT", 3, 1);
        session.handle_input(&key("c"));
        session.load_document(&document(2, 1, "OK")).unwrap();
        assert_eq!(session.puzzle().cols(), 2);
        assert_eq!(session.puzzle().cell(0), Cell::Empty);
        assert_eq!(session.selection().selected, 0);
    }

    #[test]
    fn test_replace_transport_forgets_identity() {
        let (mut session, _) = session("CAT", 3, 1);
        session.handle_frame(Frame::AssignId("old".to_string())).unwrap();
        session.replace_transport(MemoryTransport::new());
        assert_eq!(session.identity(), None);
    }
}
