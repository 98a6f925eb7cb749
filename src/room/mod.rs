pub mod room;
pub mod store;

pub use room::{names_equal, now_millis, ChatMessage, MessageKind, Phase, Player, Room};
pub use store::{JoinOutcome, RoomStore};
