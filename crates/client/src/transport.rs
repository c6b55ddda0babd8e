//! Transport abstraction between the session and the relay socket
//!
//! Sending is fire-and-forget. Inbound frames are pushed into the session by
//! whoever owns the socket, so the trait only covers the outbound half.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crossword_web_protocol::Frame;

use crate::Result;

/// Outbound half of a relay connection
pub trait Transport {
    /// Queue a frame for delivery; no acknowledgement is awaited
    fn send(&mut self, frame: &Frame) -> Result<()>;

    /// Whether frames sent now can reach the relay
    fn is_connected(&self) -> bool;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, frame: &Frame) -> Result<()> {
        (**self).send(frame)
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}

/// In-memory transport that records every frame sent through it
///
/// Clones share the same outbox, so a test can keep one handle while the
/// session owns another.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    outbox: Rc<RefCell<VecDeque<Frame>>>,
    connected: Rc<Cell<bool>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            outbox: Rc::new(RefCell::new(VecDeque::new())),
            connected: Rc::new(Cell::new(true)),
        }
    }

    /// Take every frame sent so far, oldest first
    pub fn drain(&self) -> Vec<Frame> {
        self.outbox.borrow_mut().drain(..).collect()
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.set(connected);
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MemoryTransport {
    fn send(&mut self, frame: &Frame) -> Result<()> {
        if !self.connected.get() {
            return Err(crate::ClientError::NotConnected);
        }
        self.outbox.borrow_mut().push_back(frame.clone());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossword_web_protocol::PositionUpdate;

    #[test]
    fn test_memory_transport_shares_outbox() {
        let handle = MemoryTransport::new();
        let mut owned = handle.clone();
        owned
            .send(&Frame::ClientPositionUpdate(PositionUpdate { position: 2 }))
            .unwrap();
        assert_eq!(handle.drain().len(), 1);
        assert!(handle.drain().is_empty());
    }

    #[test]
    fn test_memory_transport_disconnected() {
        let mut transport = MemoryTransport::new();
        transport.set_connected(false);
        assert!(!transport.is_connected());
        assert!(transport
            .send(&Frame::AssignId("x".to_string()))
            .is_err());
    }
}
