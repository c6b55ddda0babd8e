//! Common test utilities
#![allow(dead_code)] // Not every helper is used by every test file

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use crossword_web_host::{Board, Relay};
use crossword_web_protocol::Frame;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};

pub type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const MINI: &str = r#"{
    "title": "Mini",
    "size": {"cols": 3, "rows": 3},
    "clues": {"across": ["1.Pet", "3.Canine"], "down": ["2.Limb"]},
    "grid": ["C", "A", "T", ".", "R", ".", "D", "O", "G"],
    "gridnums": [1, 2, 0, 0, 0, 0, 3, 0, 0]
}"#;

/// A relay running on an ephemeral port
pub struct TestRelay {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestRelay {
    pub async fn start(source: &str) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let relay = Relay::shared(Board::from_source_json(source)?);
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let shutdown = async {
                let _ = rx.await;
            };
            crossword_web_host::serve(listener, relay, shutdown).await
        });

        Ok(Self {
            addr,
            shutdown: Some(tx),
        })
    }

    pub fn http_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn connect(&self) -> Result<Socket> {
        let url = format!("ws://{}/socket", self.addr);
        let (socket, _) = tokio_tungstenite::connect_async(url).await?;
        Ok(socket)
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Next relay frame, skipping control messages
pub async fn next_frame(socket: &mut Socket) -> Result<Frame> {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .context("timed out waiting for a frame")?
            .context("socket closed")??;
        if let Message::Text(text) = message {
            return Ok(Frame::from_text(&text)?);
        }
    }
}

/// Skip frames until one matches, returning everything skipped along the way
pub async fn wait_for<P>(socket: &mut Socket, mut predicate: P) -> Result<(Frame, Vec<Frame>)>
where
    P: FnMut(&Frame) -> bool,
{
    let mut skipped = Vec::new();
    loop {
        let frame = next_frame(socket).await?;
        if predicate(&frame) {
            return Ok((frame, skipped));
        }
        skipped.push(frame);
    }
}

pub async fn send_frame(socket: &mut Socket, frame: &Frame) -> Result<()> {
    socket.send(Message::Text(frame.to_text()?)).await?;
    Ok(())
}

/// Connect and consume the identity assignment
pub async fn join(relay: &TestRelay) -> Result<(Socket, String)> {
    let mut socket = relay.connect().await?;
    match next_frame(&mut socket).await? {
        Frame::AssignId(id) => Ok((socket, id)),
        other => anyhow::bail!("expected identity, got {}", other.event_name()),
    }
}
