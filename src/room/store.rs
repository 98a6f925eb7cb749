use std::collections::HashMap;

use rand::Rng;

use crate::error::{GameError, GameResult};
use crate::room::{Player, Room};

/// Room codes are 6 characters from an alphabet without visually
/// ambiguous characters (no I, L, O, 0, 1).
pub const ROOM_ID_LEN: usize = 6;
pub const ROOM_ID_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Outcome of a join: an existing name resolves idempotently and must
/// not trigger persistence or propagation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    Existing(String),
    Added(String),
}

impl JoinOutcome {
    pub fn username(&self) -> &str {
        match self {
            JoinOutcome::Existing(name) | JoinOutcome::Added(name) => name,
        }
    }
}

/// The single source of truth for all rooms. Explicitly owned and
/// passed around; never a process-wide static.
#[derive(Debug, Clone, Default)]
pub struct RoomStore {
    rooms: HashMap<String, Room>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn get_mut(&mut self, room_id: &str) -> Option<&mut Room> {
        self.rooms.get_mut(room_id)
    }

    pub fn require(&self, room_id: &str) -> GameResult<&Room> {
        self.get(room_id)
            .ok_or_else(|| GameError::NotFound(room_id.to_string()))
    }

    pub fn require_mut(&mut self, room_id: &str) -> GameResult<&mut Room> {
        self.rooms
            .get_mut(room_id)
            .ok_or_else(|| GameError::NotFound(room_id.to_string()))
    }

    pub fn insert(&mut self, room: Room) {
        self.rooms.insert(room.id.clone(), room);
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Sample the alphabet until an unused code comes up.
    fn generate_room_id(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let id: String = (0..ROOM_ID_LEN)
                .map(|_| ROOM_ID_ALPHABET[rng.gen_range(0..ROOM_ID_ALPHABET.len())] as char)
                .collect();
            if !self.rooms.contains_key(&id) {
                return id;
            }
        }
    }

    /// Create a room with the creator as sole player and host.
    pub fn create_room(&mut self, username: &str) -> GameResult<&Room> {
        let name = username.trim();
        if name.is_empty() {
            return Err(GameError::validation("username must not be blank"));
        }
        let id = self.generate_room_id();
        let room = self
            .rooms
            .entry(id.clone())
            .or_insert_with(|| Room::new(id.clone(), name));
        tracing::info!(room = %room.id, host = %room.host, "room created");
        Ok(room)
    }

    /// Join a room. An existing name (case-insensitive) resolves to its
    /// canonical casing without mutating anything.
    pub fn join_room(&mut self, room_id: &str, username: &str) -> GameResult<JoinOutcome> {
        let name = username.trim();
        if room_id.trim().is_empty() {
            return Err(GameError::validation("room id must not be blank"));
        }
        if name.is_empty() {
            return Err(GameError::validation("username must not be blank"));
        }
        let room = self.require_mut(room_id)?;
        if let Some(canonical) = room.resolve_name(name) {
            return Ok(JoinOutcome::Existing(canonical));
        }
        room.players.push(Player::new(name));
        tracing::info!(room = %room.id, player = %name, "player joined");
        Ok(JoinOutcome::Added(name.to_string()))
    }
}
