use crate::error::{GameError, GameResult};
use crate::room::{ChatMessage, Phase, Room};
use crate::words::random_word;

/// Minimum roster size to start a round.
pub const MIN_PLAYERS_TO_START: usize = 2;

/// Transition a room from `Lobby` to `Playing`. Host-only. The host is
/// also the drawer for the round; there is no rotation and no
/// transition back to the lobby (one playable round per room).
pub fn start_round(room: &mut Room, username: &str) -> GameResult<()> {
    let name = username.trim();
    if name.is_empty() {
        return Err(GameError::validation("username must not be blank"));
    }
    if !room.is_host(name) {
        return Err(GameError::policy("only the host can start the round"));
    }
    if room.phase != Phase::Lobby {
        return Err(GameError::policy("the round has already started"));
    }
    if room.players.len() < MIN_PLAYERS_TO_START {
        return Err(GameError::policy(
            "at least two players are needed to start",
        ));
    }

    room.phase = Phase::Playing;
    room.drawer = Some(room.host.clone());
    room.word = random_word().to_string();
    room.strokes.clear();
    room.guessed.clear();
    room.messages = vec![ChatMessage::system(format!(
        "Round started! {} is drawing.",
        room.host
    ))];
    tracing::info!(room = %room.id, drawer = %room.host, "round started");
    Ok(())
}
