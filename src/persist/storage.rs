use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::game::stroke::Stroke;
use crate::room::{now_millis, ChatMessage, Phase, Player, Room, RoomStore};

pub const SAVE_FORMAT_VERSION: u32 = 1;

/// Durable JSON snapshot of the whole room store. A durability aid
/// only; the in-memory store stays authoritative and keeps serving
/// when the file is unreadable or unwritable.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveFile {
    version: u32,
    saved_at: u64,
    /// Raw values so one malformed entry drops alone instead of
    /// aborting the whole load.
    #[serde(default)]
    rooms: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRoom {
    id: String,
    #[serde(default = "default_phase")]
    phase: Phase,
    #[serde(default)]
    host: String,
    #[serde(default)]
    drawer: Option<String>,
    #[serde(default)]
    word: String,
    #[serde(default)]
    players: Vec<StoredPlayer>,
    #[serde(default)]
    guessed_players: Vec<String>,
    #[serde(default)]
    messages: Vec<ChatMessage>,
    #[serde(default)]
    strokes: Vec<Stroke>,
    #[serde(default = "now_millis")]
    created_at: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPlayer {
    #[serde(default)]
    name: String,
    #[serde(default, deserialize_with = "lenient_score")]
    score: u32,
}

fn default_phase() -> Phase {
    Phase::Lobby
}

/// Anything that is not a finite non-negative number becomes zero.
fn lenient_score<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_f64()
        .filter(|score| score.is_finite() && *score >= 0.0)
        .map(|score| score as u32)
        .unwrap_or(0))
}

impl StoredRoom {
    fn from_room(room: &Room) -> Self {
        Self {
            id: room.id.clone(),
            phase: room.phase,
            host: room.host.clone(),
            drawer: room.drawer.clone(),
            word: room.word.clone(),
            players: room
                .players
                .iter()
                .map(|p| StoredPlayer {
                    name: p.name.clone(),
                    score: p.score,
                })
                .collect(),
            guessed_players: room.guessed.clone(),
            messages: room.messages.clone(),
            strokes: room.strokes.clone(),
            created_at: room.created_at,
        }
    }

    /// Coerce a stored entry back into a valid room, or reject it.
    fn restore(self) -> Option<Room> {
        if self.id.trim().is_empty() {
            return None;
        }

        // Distinct non-blank names, first-seen casing kept.
        let mut players: Vec<Player> = Vec::new();
        for stored in self.players {
            let name = stored.name.trim();
            if name.is_empty() {
                continue;
            }
            if !players.iter().any(|p| crate::room::names_equal(&p.name, name)) {
                players.push(Player {
                    name: name.to_string(),
                    score: stored.score,
                });
            }
        }
        if players.is_empty() {
            return None;
        }

        let host = players
            .iter()
            .find(|p| crate::room::names_equal(&p.name, &self.host))
            .map(|p| p.name.clone())
            .unwrap_or_else(|| players[0].name.clone());

        let drawer = self.drawer.and_then(|d| {
            players
                .iter()
                .find(|p| crate::room::names_equal(&p.name, &d))
                .map(|p| p.name.clone())
        });

        // A playing room without a word or drawer cannot resume; it
        // falls back to the lobby.
        let (phase, word, drawer) = match self.phase {
            Phase::Playing if !self.word.trim().is_empty() && drawer.is_some() => {
                (Phase::Playing, self.word, drawer)
            }
            Phase::Playing => (Phase::Lobby, String::new(), None),
            Phase::Lobby => (Phase::Lobby, String::new(), drawer),
        };

        let guessed = self
            .guessed_players
            .iter()
            .filter(|g| players.iter().any(|p| crate::room::names_equal(&p.name, g)))
            .cloned()
            .collect();

        Some(Room {
            id: self.id,
            phase,
            host,
            drawer,
            word,
            players,
            guessed,
            messages: self.messages,
            strokes: self.strokes,
            created_at: self.created_at,
        })
    }
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the saved store, dropping invalid entries individually.
    /// Any file-level problem yields an empty store.
    pub fn load(&self) -> RoomStore {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no saved state, starting empty");
                return RoomStore::new();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read saved state");
                return RoomStore::new();
            }
        };

        let file: SaveFile = match serde_json::from_str(&text) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "saved state is not valid JSON");
                return RoomStore::new();
            }
        };
        if file.version != SAVE_FORMAT_VERSION {
            tracing::warn!(
                version = file.version,
                expected = SAVE_FORMAT_VERSION,
                "unknown save format version, starting empty"
            );
            return RoomStore::new();
        }

        let mut store = RoomStore::new();
        let total = file.rooms.len();
        for value in file.rooms {
            match serde_json::from_value::<StoredRoom>(value) {
                Ok(entry) => {
                    if let Some(room) = entry.restore() {
                        store.insert(room);
                    }
                }
                Err(e) => tracing::warn!(error = %e, "dropping malformed room entry"),
            }
        }
        tracing::info!(loaded = store.len(), total, "restored rooms from disk");
        store
    }

    /// Write the whole store atomically (temp file + rename).
    pub fn save(&self, store: &RoomStore) -> io::Result<()> {
        let file = SaveFile {
            version: SAVE_FORMAT_VERSION,
            saved_at: now_millis(),
            rooms: store
                .iter()
                .map(StoredRoom::from_room)
                .filter_map(|r| serde_json::to_value(r).ok())
                .collect(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{guess, round, stroke};
    use crate::snapshot::serialize;
    use std::path::Path;
    use tokio_test::assert_ok;
    use uuid::Uuid;

    fn temp_storage() -> Storage {
        let path = std::env::temp_dir().join(format!("sketchparty-test-{}.json", Uuid::new_v4()));
        Storage::new(path)
    }

    fn cleanup(path: &Path) {
        let _ = fs::remove_file(path);
    }

    fn populated_store() -> RoomStore {
        let mut store = RoomStore::new();
        let id = store.create_room("Ann").unwrap().id.clone();
        store.join_room(&id, "Bob").unwrap();
        let room = store.get_mut(&id).unwrap();
        round::start_round(room, "Ann").unwrap();
        let word = room.word.clone();
        guess::submit_guess(room, "Bob", &word).unwrap();
        stroke::append_stroke(
            room,
            "Ann",
            stroke::StrokeInput {
                mode: stroke::StrokeMode::Stroke,
                color: "#112233".to_string(),
                size: 6,
                points: vec![
                    stroke::Point { x: 1.0, y: 2.0 },
                    stroke::Point { x: 3.0, y: 4.0 },
                ],
            },
        )
        .unwrap();
        store
    }

    #[test]
    fn test_round_trip_preserves_snapshots() {
        let storage = temp_storage();
        let store = populated_store();
        let room = store.iter().next().unwrap();
        let id = room.id.clone();

        tokio_test::assert_ok!(storage.save(&store));
        let reloaded = storage.load();
        let restored = reloaded.get(&id).unwrap();

        for viewer in ["Ann", "Bob", "someone-else"] {
            assert_eq!(
                serialize(store.get(&id).unwrap(), viewer),
                serialize(restored, viewer)
            );
        }
        cleanup(&storage.path);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let storage = temp_storage();
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_garbage_file_loads_empty() {
        let storage = temp_storage();
        fs::write(&storage.path, "not json at all").unwrap();
        assert!(storage.load().is_empty());
        cleanup(&storage.path);
    }

    #[test]
    fn test_malformed_entries_drop_individually() {
        let storage = temp_storage();
        let json = serde_json::json!({
            "version": SAVE_FORMAT_VERSION,
            "savedAt": 0,
            "rooms": [
                { "note": "no id at all" },
                { "id": "EMPTYR", "players": [] },
                { "id": "GOODRM", "host": "Ann",
                  "players": [{ "name": "Ann", "score": 10 }] },
            ],
        });
        fs::write(&storage.path, json.to_string()).unwrap();
        let store = storage.load();
        assert_eq!(store.len(), 1);
        assert!(store.get("GOODRM").is_some());
        cleanup(&storage.path);
    }

    #[test]
    fn test_field_coercions_on_load() {
        let storage = temp_storage();
        let json = serde_json::json!({
            "version": SAVE_FORMAT_VERSION,
            "savedAt": 0,
            "rooms": [
                {
                    "id": "COERCE",
                    "phase": "playing",
                    "host": "Ann",
                    "word": "apple",
                    // Drawer unknown to the roster.
                    "drawer": "Ghost",
                    "players": [
                        { "name": "Ann", "score": "wat" },
                        { "name": "Bob", "score": -4 },
                        { "name": "bob", "score": 7 },
                    ],
                    "guessedPlayers": ["Bob", "Ghost"],
                },
            ],
        });
        fs::write(&storage.path, json.to_string()).unwrap();
        let store = storage.load();
        let room = store.get("COERCE").unwrap();

        // Bad scores become zero, duplicate names collapse.
        assert_eq!(room.players.len(), 2);
        assert_eq!(room.players[0].score, 0);
        assert_eq!(room.players[1].score, 0);
        // Playing with no resolvable drawer falls back to the lobby.
        assert_eq!(room.phase, Phase::Lobby);
        assert!(room.word.is_empty());
        assert_eq!(room.drawer, None);
        // Guessed set keeps only roster members.
        assert_eq!(room.guessed, vec!["Bob".to_string()]);
        // Absent lists come back empty.
        assert!(room.messages.is_empty());
        assert!(room.strokes.is_empty());
        cleanup(&storage.path);
    }

    #[test]
    fn test_unknown_version_loads_empty() {
        let storage = temp_storage();
        let json = serde_json::json!({
            "version": 99,
            "savedAt": 0,
            "rooms": [{ "id": "GOODRM", "players": [{ "name": "Ann" }] }],
        });
        fs::write(&storage.path, json.to_string()).unwrap();
        assert!(storage.load().is_empty());
        cleanup(&storage.path);
    }

    #[test]
    fn test_save_reports_io_failure() {
        let storage = Storage::new("/proc/definitely/not/writable/state.json");
        let store = RoomStore::new();
        assert!(storage.save(&store).is_err());
    }
}
