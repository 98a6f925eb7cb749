use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};

use crate::snapshot::RoomSnapshot;

/// Message types sent from client to server over the push channel.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Declare interest in a room as a given viewer. Answered with an
    /// immediate snapshot (or room-missing), then pushed on every
    /// mutation of that room.
    #[serde(rename_all = "camelCase")]
    Subscribe { room_id: String, username: String },
}

/// Message types sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    Snapshot { snapshot: RoomSnapshot },
    #[serde(rename_all = "camelCase")]
    RoomMissing { room_id: String },
    #[serde(rename_all = "camelCase")]
    Error { message: String },
}

impl ServerMessage {
    pub fn to_ws_message(&self) -> Message {
        Message::Text(serde_json::to_string(self).unwrap_or_default())
    }
}
