//! The JSON message exchanged over the local websocket link.
//!
//! The producer broadcasts text frames like `{"power": 183.0}`; the power
//! meter parses them back. Anything else is a parse error for the receiver to
//! log and drop.

use serde::{Deserialize, Serialize};

/// A single power reading in watts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpdate {
    pub power: f64,
}

impl PowerUpdate {
    pub fn new(power: f64) -> Self {
        Self { power }
    }

    /// Serialize to a websocket text frame body.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a websocket text frame body.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
