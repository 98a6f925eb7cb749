use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::stroke::Stroke;

/// Author name used for server-generated chat messages.
pub const SYSTEM_AUTHOR: &str = "System";

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Player names are compared case-insensitively for identity; the
/// first-seen casing stays canonical.
pub fn names_equal(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Lobby,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Guess,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub kind: MessageKind,
    pub author: String,
    pub text: String,
    pub at: u64,
}

impl ChatMessage {
    pub fn guess(author: &str, text: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: MessageKind::Guess,
            author: author.to_string(),
            text: text.to_string(),
            at: now_millis(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: MessageKind::System,
            author: SYSTEM_AUTHOR.to_string(),
            text: text.into(),
            at: now_millis(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    pub score: u32,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 0,
        }
    }
}

/// One game's shared state. Owned exclusively by the `RoomStore`;
/// reads go out as deep-copied snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: String,
    pub phase: Phase,
    /// Name of the creator. Never changes.
    pub host: String,
    /// Current illustrator. Always a member of `players` when set.
    pub drawer: Option<String>,
    /// Secret word. Non-empty iff `phase == Playing`.
    pub word: String,
    /// Distinct players in join order.
    pub players: Vec<Player>,
    /// Players who guessed correctly this round, in guess order.
    pub guessed: Vec<String>,
    pub messages: Vec<ChatMessage>,
    pub strokes: Vec<Stroke>,
    pub created_at: u64,
}

impl Room {
    pub fn new(id: impl Into<String>, host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            id: id.into(),
            phase: Phase::Lobby,
            host: host.clone(),
            drawer: None,
            word: String::new(),
            players: vec![Player::new(host)],
            guessed: Vec::new(),
            messages: Vec::new(),
            strokes: Vec::new(),
            created_at: now_millis(),
        }
    }

    /// Resolve a name to the canonical casing stored in the roster.
    pub fn resolve_name(&self, name: &str) -> Option<String> {
        self.players
            .iter()
            .find(|p| names_equal(&p.name, name))
            .map(|p| p.name.clone())
    }

    pub fn is_host(&self, name: &str) -> bool {
        names_equal(&self.host, name)
    }

    pub fn is_drawer(&self, name: &str) -> bool {
        self.drawer
            .as_deref()
            .map(|d| names_equal(d, name))
            .unwrap_or(false)
    }

    pub fn has_guessed(&self, name: &str) -> bool {
        self.guessed.iter().any(|g| names_equal(g, name))
    }

    pub fn award(&mut self, name: &str, points: u32) {
        if let Some(player) = self
            .players
            .iter_mut()
            .find(|p| names_equal(&p.name, name))
        {
            player.score = player.score.saturating_add(points);
        }
    }
}
