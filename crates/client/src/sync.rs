//! Sync emitter and receiver
//!
//! Grid, position and identity travel on separate channels. The receiver
//! applies last-write-wins: whatever the relay delivers last is what a cell
//! shows, with no ordering or merge beyond that.

use crossword_web_protocol::{Frame, GridUpdate, PositionBroadcast, PositionUpdate, UpdateMethod};

use crate::cursor::Selection;
use crate::input::Outbound;
use crate::puzzle::{Cell, Puzzle};
use crate::transport::Transport;
use crate::{ClientError, Result};

/// A frame a client is expected to receive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Identity(String),
    Grid(GridUpdate),
    Positions(PositionBroadcast),
}

impl TryFrom<Frame> for Inbound {
    type Error = ClientError;

    fn try_from(frame: Frame) -> Result<Self> {
        match frame {
            Frame::AssignId(id) => Ok(Self::Identity(id)),
            Frame::ServerGridUpdate(update) => Ok(Self::Grid(update)),
            Frame::ServerPositionUpdate(broadcast) => Ok(Self::Positions(broadcast)),
            other => Err(ClientError::MalformedMessage(format!(
                "{} is not a relay frame",
                other.event_name()
            ))),
        }
    }
}

/// Decode a text frame received from the relay
pub fn decode_inbound(text: &str) -> Result<Inbound> {
    Inbound::try_from(Frame::from_text(text)?)
}

/// Wrap a local side effect in its outbound frame
pub fn outbound_frame(outbound: Outbound) -> Frame {
    match outbound {
        Outbound::Grid(update) => Frame::ClientGridUpdate(update),
        Outbound::Position(position) => Frame::ClientPositionUpdate(PositionUpdate { position }),
    }
}

/// Publish a local side effect
pub fn emit<T: Transport + ?Sized>(transport: &mut T, outbound: Outbound) -> Result<()> {
    let frame = outbound_frame(outbound);
    tracing::trace!(event = frame.event_name(), "emit");
    transport.send(&frame)
}

/// Merge a grid update received from another session
///
/// `revealed` updates replay the reveal from the local answer grid; manual
/// updates write the (uppercased) value directly.
pub fn apply_grid_update(puzzle: &mut Puzzle, update: &GridUpdate) -> Result<()> {
    match update.method {
        UpdateMethod::Revealed => puzzle.reveal(update.position).map(|_| ()).ok_or_else(|| {
            ClientError::MalformedMessage(format!("cannot reveal cell {}", update.position))
        }),
        UpdateMethod::Manual => {
            let cell = Cell::from_wire(&update.value)
                .filter(|cell| !cell.is_block())
                .ok_or_else(|| {
                    ClientError::MalformedMessage(format!("bad cell value {:?}", update.value))
                })?;
            if puzzle.set_cell(update.position, cell) {
                Ok(())
            } else {
                Err(ClientError::MalformedMessage(format!(
                    "cell {} is not fillable",
                    update.position
                )))
            }
        }
    }
}

/// Replace the remote cursor set with a fresh broadcast
///
/// The entry belonging to `own_id` is dropped. On a malformed broadcast the
/// previous cursors are kept.
pub fn apply_position_broadcast(
    selection: &mut Selection,
    broadcast: &PositionBroadcast,
    own_id: Option<&str>,
) -> Result<()> {
    let entries = broadcast.entries()?;
    selection.remote_cursors = entries
        .into_iter()
        .filter(|&(id, _)| Some(id) != own_id)
        .map(|(_, position)| position)
        .collect();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{apply, Instruction};
    use crate::puzzle::tests::puzzle;
    use crate::transport::MemoryTransport;

    #[test]
    fn test_outbound_frames() {
        assert_eq!(
            outbound_frame(Outbound::Position(3)),
            Frame::ClientPositionUpdate(PositionUpdate { position: 3 })
        );
        assert_eq!(
            outbound_frame(Outbound::Grid(GridUpdate::manual(1, "A"))),
            Frame::ClientGridUpdate(GridUpdate::manual(1, "A"))
        );
    }

    #[test]
    fn test_envelope_reproduces_mutation() {
        let mut sender = puzzle(3, 2, "CATDOG");
        let mut receiver = sender.clone();
        let mut selection = Selection::for_puzzle(&sender);
        let mut transport = MemoryTransport::new();

        for instruction in [
            Instruction::Letter('c'),
            Instruction::Letter('z'),
            Instruction::Delete,
            Instruction::Reveal,
            Instruction::Select(4),
            Instruction::Letter('o'),
        ] {
            if let Some(outbound) = apply(&mut sender, &mut selection, instruction) {
                emit(&mut transport, outbound).unwrap();
            }
        }

        for frame in transport.drain() {
            // The relay renames client frames before fan-out
            let text = match frame {
                Frame::ClientGridUpdate(update) => Frame::ServerGridUpdate(update),
                other => other,
            }
            .to_text()
            .unwrap();
            if let Ok(Inbound::Grid(update)) = decode_inbound(&text) {
                apply_grid_update(&mut receiver, &update).unwrap();
            }
        }

        assert_eq!(receiver.cells(), sender.cells());
        assert_eq!(receiver.revealed(), sender.revealed());
    }

    #[test]
    fn test_manual_update_uppercases() {
        let mut p = puzzle(2, 1, "AB");
        apply_grid_update(&mut p, &GridUpdate::manual(1, "b")).unwrap();
        assert_eq!(p.cell(1), Cell::Letter('B'));
        apply_grid_update(&mut p, &GridUpdate::manual(1, " ")).unwrap();
        assert_eq!(p.cell(1), Cell::Empty);
    }

    #[test]
    fn test_non_ascii_update_rejected() {
        let mut p = puzzle(2, 1, "AB");
        assert!(matches!(
            apply_grid_update(&mut p, &GridUpdate::manual(0, "é")),
            Err(ClientError::MalformedMessage(_))
        ));
        assert_eq!(p.cell(0), Cell::Empty);
    }

    #[test]
    fn test_bad_grid_updates_leave_state() {
        let mut p = puzzle(3, 1, "A#B");
        let before = p.cells().to_vec();
        assert!(apply_grid_update(&mut p, &GridUpdate::manual(1, "X")).is_err());
        assert!(apply_grid_update(&mut p, &GridUpdate::manual(7, "X")).is_err());
        assert!(apply_grid_update(&mut p, &GridUpdate::manual(0, ".")).is_err());
        assert!(apply_grid_update(&mut p, &GridUpdate::manual(0, "XY")).is_err());
        assert!(apply_grid_update(&mut p, &GridUpdate::revealed(1, "")).is_err());
        assert_eq!(p.cells(), before.as_slice());
    }

    #[test]
    fn test_remote_reveal_is_idempotent() {
        let mut p = puzzle(2, 1, "OK");
        apply_grid_update(&mut p, &GridUpdate::revealed(0, "O")).unwrap();
        apply_grid_update(&mut p, &GridUpdate::revealed(0, "O")).unwrap();
        assert_eq!(p.cell(0), Cell::Letter('O'));
        assert!(p.is_revealed(0));
    }

    #[test]
    fn test_positions_replace_and_exclude_self() {
        let mut selection = Selection {
            remote_cursors: vec![8, 9],
            ..Selection::default()
        };
        let broadcast = PositionBroadcast::from_entries([("me", 1), ("a", 4), ("b", 6)]);
        apply_position_broadcast(&mut selection, &broadcast, Some("me")).unwrap();
        assert_eq!(selection.remote_cursors, vec![4, 6]);
    }

    #[test]
    fn test_malformed_positions_keep_previous() {
        let mut selection = Selection {
            remote_cursors: vec![2],
            ..Selection::default()
        };
        let broadcast = PositionBroadcast {
            websocket_id: vec!["a".to_string()],
            position: vec!["x".to_string()],
        };
        assert!(apply_position_broadcast(&mut selection, &broadcast, None).is_err());
        assert_eq!(selection.remote_cursors, vec![2]);
    }

    #[test]
    fn test_client_frames_are_not_inbound() {
        let text = Frame::ClientGridUpdate(GridUpdate::manual(0, "A"))
            .to_text()
            .unwrap();
        assert!(matches!(
            decode_inbound(&text),
            Err(ClientError::MalformedMessage(_))
        ));
        assert!(matches!(decode_inbound("{oops"), Err(ClientError::Decode(_))));
    }
}
