use serde::{Deserialize, Serialize};

use crate::game::stroke::Stroke;
use crate::room::{ChatMessage, Phase, Player, Room};

/// Replaces every alphanumeric character of the secret word for
/// non-drawer viewers.
pub const MASK_CHAR: char = '_';

/// The externally visible projection of a room for one viewer. All
/// lists are deep copies; callers cannot reach stored state through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_id: String,
    pub phase: Phase,
    pub host: String,
    pub drawer: Option<String>,
    /// Sorted by descending score; ties keep join order.
    pub players: Vec<Player>,
    /// The secret word for the drawer, a masked placeholder for
    /// everyone else, empty in the lobby.
    pub word_display: String,
    pub can_draw: bool,
    pub guessed_players: Vec<String>,
    pub messages: Vec<ChatMessage>,
    pub strokes: Vec<Stroke>,
}

/// Mask every letter/digit, preserving length and separators.
pub fn mask_word(word: &str) -> String {
    word.chars()
        .map(|c| if c.is_alphanumeric() { MASK_CHAR } else { c })
        .collect()
}

/// Project a room for one viewer. Pure; never mutates.
pub fn serialize(room: &Room, viewer: &str) -> RoomSnapshot {
    let is_drawer = room.is_drawer(viewer);
    let word_display = match room.phase {
        Phase::Lobby => String::new(),
        Phase::Playing if is_drawer => room.word.clone(),
        Phase::Playing => mask_word(&room.word),
    };

    let mut players = room.players.clone();
    players.sort_by(|a, b| b.score.cmp(&a.score));

    RoomSnapshot {
        room_id: room.id.clone(),
        phase: room.phase,
        host: room.host.clone(),
        drawer: room.drawer.clone(),
        players,
        word_display,
        can_draw: room.phase == Phase::Playing && is_drawer,
        guessed_players: room.guessed.clone(),
        messages: room.messages.clone(),
        strokes: room.strokes.clone(),
    }
}
