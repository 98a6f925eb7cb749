use crate::error::{GameError, GameResult};
use crate::room::{ChatMessage, Phase, Room};

pub const BASE_GUESS_POINTS: u32 = 120;
pub const GUESS_POINTS_STEP: u32 = 30;
pub const MIN_GUESS_POINTS: u32 = 30;
pub const DRAWER_POINTS_PER_GUESS: u32 = 15;

/// Points for the `order`-th (1-based) distinct correct guesser:
/// 120, 90, 60, 30, 30, ...
pub fn guess_points(order: usize) -> u32 {
    BASE_GUESS_POINTS
        .saturating_sub(GUESS_POINTS_STEP.saturating_mul(order.saturating_sub(1) as u32))
        .max(MIN_GUESS_POINTS)
}

/// Judge a guess. The raw text is always echoed as a chat message,
/// correct or not; points are only awarded on a player's first correct
/// match of the round. The match is case-insensitive whole-string
/// equality against the secret word.
pub fn submit_guess(room: &mut Room, username: &str, text: &str) -> GameResult<()> {
    let name = username.trim();
    let guess = text.trim();
    if name.is_empty() {
        return Err(GameError::validation("username must not be blank"));
    }
    if guess.is_empty() {
        return Err(GameError::validation("guess text must not be blank"));
    }
    if room.phase != Phase::Playing {
        return Err(GameError::policy("no round in progress"));
    }
    let guesser = room
        .resolve_name(name)
        .ok_or_else(|| GameError::policy("join the room before guessing"))?;
    if room.is_drawer(&guesser) {
        return Err(GameError::policy("the drawer cannot guess"));
    }

    // The echo carries the text exactly as submitted; only the match
    // is trimmed.
    room.messages.push(ChatMessage::guess(&guesser, text));

    let correct = guess.to_lowercase() == room.word.to_lowercase();
    if correct && !room.has_guessed(&guesser) {
        room.guessed.push(guesser.clone());
        let order = room.guessed.len();
        let points = guess_points(order);
        room.award(&guesser, points);
        if let Some(drawer) = room.drawer.clone() {
            room.award(&drawer, DRAWER_POINTS_PER_GUESS);
        }
        room.messages.push(ChatMessage::system(format!(
            "{} guessed the word! (+{} points)",
            guesser, points
        )));
        tracing::info!(room = %room.id, player = %guesser, order, points, "correct guess");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::{MessageKind, Player};

    fn playing_room() -> Room {
        let mut room = Room::new("AB23CD", "Ann");
        room.players.push(Player::new("Bob"));
        room.players.push(Player::new("Cid"));
        room.phase = Phase::Playing;
        room.drawer = Some("Ann".to_string());
        room.word = "apple".to_string();
        room
    }

    fn score_of(room: &Room, name: &str) -> u32 {
        room.players
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.score)
            .unwrap()
    }

    #[test]
    fn test_guess_points_table() {
        assert_eq!(guess_points(1), 120);
        assert_eq!(guess_points(2), 90);
        assert_eq!(guess_points(3), 60);
        assert_eq!(guess_points(4), 30);
        assert_eq!(guess_points(5), 30);
        assert_eq!(guess_points(100), 30);
    }

    #[test]
    fn test_wrong_guess_is_chat_only() {
        let mut room = playing_room();
        submit_guess(&mut room, "Bob", "banana").unwrap();
        assert_eq!(score_of(&room, "Bob"), 0);
        assert!(room.guessed.is_empty());
        assert_eq!(room.messages.len(), 1);
        assert_eq!(room.messages[0].kind, MessageKind::Guess);
        assert_eq!(room.messages[0].text, "banana");
    }

    #[test]
    fn test_scoring_scenario() {
        let mut room = playing_room();

        submit_guess(&mut room, "Bob", "Apple").unwrap();
        assert_eq!(score_of(&room, "Bob"), 120);
        assert_eq!(score_of(&room, "Ann"), 15);
        assert_eq!(room.guessed, vec!["Bob".to_string()]);
        // Guess echo followed by the system congrats.
        assert_eq!(room.messages.len(), 2);
        assert_eq!(room.messages[0].kind, MessageKind::Guess);
        assert_eq!(room.messages[1].kind, MessageKind::System);

        submit_guess(&mut room, "Cid", "apple").unwrap();
        assert_eq!(score_of(&room, "Cid"), 90);
        assert_eq!(score_of(&room, "Ann"), 30);
        assert_eq!(room.guessed.len(), 2);
    }

    #[test]
    fn test_echo_keeps_raw_text_but_match_is_trimmed() {
        let mut room = playing_room();
        submit_guess(&mut room, "Bob", "  Apple  ").unwrap();
        assert_eq!(score_of(&room, "Bob"), 120);
        assert_eq!(room.messages[0].text, "  Apple  ");
    }

    #[test]
    fn test_repeat_correct_guess_scores_once() {
        let mut room = playing_room();
        submit_guess(&mut room, "Bob", "apple").unwrap();
        submit_guess(&mut room, "Bob", "apple").unwrap();
        assert_eq!(score_of(&room, "Bob"), 120);
        assert_eq!(score_of(&room, "Ann"), 15);
        assert_eq!(room.guessed.len(), 1);
        // The repeat still lands in chat.
        assert_eq!(room.messages.len(), 3);
    }

    #[test]
    fn test_drawer_cannot_guess() {
        let mut room = playing_room();
        let err = submit_guess(&mut room, "Ann", "apple").unwrap_err();
        assert!(matches!(err, GameError::Policy(_)));
        assert!(room.messages.is_empty());
    }

    #[test]
    fn test_unknown_player_cannot_guess() {
        let mut room = playing_room();
        let err = submit_guess(&mut room, "Zed", "apple").unwrap_err();
        assert!(matches!(err, GameError::Policy(_)));
        assert!(room.messages.is_empty());
    }

    #[test]
    fn test_guessing_needs_active_round() {
        let mut room = Room::new("AB23CD", "Ann");
        room.players.push(Player::new("Bob"));
        let err = submit_guess(&mut room, "Bob", "apple").unwrap_err();
        assert!(matches!(err, GameError::Policy(_)));
    }

    #[test]
    fn test_blank_inputs_rejected() {
        let mut room = playing_room();
        assert!(matches!(
            submit_guess(&mut room, " ", "apple"),
            Err(GameError::Validation(_))
        ));
        assert!(matches!(
            submit_guess(&mut room, "Bob", "   "),
            Err(GameError::Validation(_))
        ));
        assert!(room.messages.is_empty());
    }
}
