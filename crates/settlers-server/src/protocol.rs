//! JSON bodies for the HTTP API.

use serde::{Deserialize, Serialize};
use settlers_core::{CornerId, Player, PlayerId};

/// Body of `POST /build/settlement`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRequest {
    pub player_id: PlayerId,
    pub corner_id: CornerId,
}

/// Reply to `POST /roll`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollResponse {
    /// Dice total (2-12)
    pub roll: u8,
    /// Every player after production was paid out
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn success() -> Self {
        Self {
            message: "Success".into(),
        }
    }
}

/// Body of every error reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
