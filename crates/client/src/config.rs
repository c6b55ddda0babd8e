//! Client configuration
//!
//! The only user-facing setting is the relay base URL. Both the puzzle
//! download and the socket endpoint are derived from it.

use crossword_web_protocol::{PUZZLE_PATH, SOCKET_PATH};
use url::Url;

use crate::{ClientError, Result};

/// Relay address used until the user picks another one
pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    relay_url: Url,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: Url::parse(DEFAULT_RELAY_URL).expect("default relay URL is valid"),
        }
    }
}

impl ClientConfig {
    pub fn new(relay_url: &str) -> Result<Self> {
        Ok(Self {
            relay_url: parse_relay_url(relay_url)?,
        })
    }

    pub const fn relay_url(&self) -> &Url {
        &self.relay_url
    }

    /// Point the client at another relay
    ///
    /// Accepts `host:port` shorthand and assumes `http`. On error the current
    /// URL is kept.
    pub fn set_relay_url(&mut self, raw: &str) -> Result<()> {
        self.relay_url = parse_relay_url(raw)?;
        Ok(())
    }

    /// Where the puzzle document is downloaded from
    pub fn puzzle_url(&self) -> Url {
        self.endpoint(PUZZLE_PATH)
    }

    /// WebSocket endpoint on the same relay (`ws`/`wss`)
    pub fn socket_url(&self) -> Result<Url> {
        let mut url = self.endpoint(SOCKET_PATH);
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|()| ClientError::UnsupportedScheme(url.scheme().to_string()))?;
        Ok(url)
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.relay_url.clone();
        let joined = format!("{}{path}", self.relay_url.path().trim_end_matches('/'));
        url.set_path(&joined);
        url
    }
}

fn parse_relay_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let mut url = if raw.contains("://") {
        Url::parse(raw)?
    } else {
        Url::parse(&format!("http://{raw}"))?
    };
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ClientError::UnsupportedScheme(other.to_string())),
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
