use serde::{Deserialize, Serialize};

use crate::{ProtocolError, Result};

/// How a grid update was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMethod {
    /// Typed or deleted by a participant
    Manual,
    /// Filled from the answer grid
    Revealed,
}

/// One atomic fill mutation
///
/// `position` travels as a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridUpdate {
    #[serde(with = "position_string")]
    pub position: usize,
    #[serde(default)]
    pub value: String,
    pub method: UpdateMethod,
}

impl GridUpdate {
    pub fn manual(position: usize, value: impl Into<String>) -> Self {
        Self {
            position,
            value: value.into(),
            method: UpdateMethod::Manual,
        }
    }

    pub fn revealed(position: usize, value: impl Into<String>) -> Self {
        Self {
            position,
            value: value.into(),
            method: UpdateMethod::Revealed,
        }
    }
}

/// Outbound cursor position of a single session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    #[serde(with = "position_string")]
    pub position: usize,
}

/// Aggregate of every connected session's latest position
///
/// The two vectors are parallel: `websocket_id[i]` sits at `position[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionBroadcast {
    #[serde(rename = "websocketID", default)]
    pub websocket_id: Vec<String>,
    #[serde(default)]
    pub position: Vec<String>,
}

impl PositionBroadcast {
    /// Build a broadcast from `(session id, cell index)` pairs
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, usize)>,
    {
        let mut broadcast = Self::default();
        for (id, position) in entries {
            broadcast.websocket_id.push(id.to_string());
            broadcast.position.push(position.to_string());
        }
        broadcast
    }

    /// Pair every session id with its parsed cell index
    ///
    /// Fails when the arrays differ in length or a position is not a
    /// non-negative integer.
    pub fn entries(&self) -> Result<Vec<(&str, usize)>> {
        if self.websocket_id.len() != self.position.len() {
            return Err(ProtocolError::Malformed(format!(
                "{} ids for {} positions",
                self.websocket_id.len(),
                self.position.len()
            )));
        }

        self.websocket_id
            .iter()
            .zip(&self.position)
            .map(|(id, raw)| {
                raw.trim()
                    .parse::<usize>()
                    .map(|position| (id.as_str(), position))
                    .map_err(|_| ProtocolError::Malformed(format!("bad position {raw:?}")))
            })
            .collect()
    }
}

/// A single WebSocket text frame
///
/// Encoded as `{"event": <name>, "data": <payload>}`. The grid, position and
/// identity channels stay separate so each receiver handles one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum Frame {
    /// Relay tells a fresh connection its identity
    #[serde(rename = "serverAssignID")]
    AssignId(String),

    /// Client publishes a fill mutation
    #[serde(rename = "clientGridUpdate")]
    ClientGridUpdate(GridUpdate),

    /// Relay forwards another session's fill mutation
    #[serde(rename = "serverGridUpdate")]
    ServerGridUpdate(GridUpdate),

    /// Client publishes its cursor position
    #[serde(rename = "clientPositionUpdate")]
    ClientPositionUpdate(PositionUpdate),

    /// Relay publishes every session's cursor position
    #[serde(rename = "serverPositionUpdate")]
    ServerPositionUpdate(PositionBroadcast),
}

impl Frame {
    /// Wire name of the frame's event
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::AssignId(_) => "serverAssignID",
            Self::ClientGridUpdate(_) => "clientGridUpdate",
            Self::ServerGridUpdate(_) => "serverGridUpdate",
            Self::ClientPositionUpdate(_) => "clientPositionUpdate",
            Self::ServerPositionUpdate(_) => "serverPositionUpdate",
        }
    }

    /// Encode as a JSON text frame
    pub fn to_text(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a JSON text frame
    pub fn from_text(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Cell indices travel as decimal strings; bare integers are tolerated.
mod position_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &usize, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.trim().parse().map_err(de::Error::custom),
            Raw::Number(n) => usize::try_from(n).map_err(de::Error::custom),
        }
    }
}
