use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::room::RoomStore;
use crate::snapshot::serialize;
use crate::websocket::message::ServerMessage;

#[derive(Debug)]
struct Subscriber {
    viewer: String,
    tx: UnboundedSender<Message>,
}

/// Publish/subscribe registry keyed by room id. Each subscriber is a
/// room + viewer pair; on every mutation of a room, each of its
/// subscribers receives a snapshot serialized for its own viewer in
/// the same pass.
#[derive(Debug, Clone, Default)]
pub struct Hub {
    inner: Arc<RwLock<HashMap<String, HashMap<Uuid, Subscriber>>>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare interest in a room. Returns a token for unsubscribe.
    pub async fn subscribe(
        &self,
        room_id: &str,
        viewer: &str,
        tx: UnboundedSender<Message>,
    ) -> Uuid {
        let token = Uuid::new_v4();
        let mut inner = self.inner.write().await;
        inner.entry(room_id.to_string()).or_default().insert(
            token,
            Subscriber {
                viewer: viewer.to_string(),
                tx,
            },
        );
        token
    }

    /// Revoke interest. Must be called when the channel closes.
    pub async fn unsubscribe(&self, room_id: &str, token: Uuid) {
        let mut inner = self.inner.write().await;
        if let Some(subs) = inner.get_mut(room_id) {
            subs.remove(&token);
            if subs.is_empty() {
                inner.remove(room_id);
            }
        }
    }

    pub async fn subscriber_count(&self, room_id: &str) -> usize {
        self.inner
            .read()
            .await
            .get(room_id)
            .map(|subs| subs.len())
            .unwrap_or(0)
    }

    /// Fan a fresh snapshot out to every subscriber of the room. A
    /// missing room produces an explicit signal, never silence. Dead
    /// channels are pruned afterwards.
    pub async fn notify(&self, store: &RoomStore, room_id: &str) {
        let mut dead = Vec::new();
        {
            let inner = self.inner.read().await;
            let Some(subs) = inner.get(room_id) else {
                return;
            };
            let room = store.get(room_id);
            for (token, sub) in subs {
                let message = match room {
                    Some(room) => ServerMessage::Snapshot {
                        snapshot: serialize(room, &sub.viewer),
                    },
                    None => ServerMessage::RoomMissing {
                        room_id: room_id.to_string(),
                    },
                };
                if sub.tx.send(message.to_ws_message()).is_err() {
                    dead.push(*token);
                }
            }
        }
        if !dead.is_empty() {
            let mut inner = self.inner.write().await;
            if let Some(subs) = inner.get_mut(room_id) {
                for token in dead {
                    subs.remove(&token);
                }
                if subs.is_empty() {
                    inner.remove(room_id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::round;
    use tokio::sync::mpsc;

    fn playing_store() -> (RoomStore, String) {
        let mut store = RoomStore::new();
        let id = store.create_room("Ann").unwrap().id.clone();
        store.join_room(&id, "Bob").unwrap();
        round::start_round(store.get_mut(&id).unwrap(), "Ann").unwrap();
        (store, id)
    }

    fn text_of(msg: Message) -> serde_json::Value {
        match msg {
            Message::Text(text) => serde_json::from_str(&text).unwrap(),
            other => panic!("expected text frame, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_notify_is_viewer_scoped() {
        let (store, id) = playing_store();
        let hub = Hub::new();
        let (ann_tx, mut ann_rx) = mpsc::unbounded_channel();
        let (bob_tx, mut bob_rx) = mpsc::unbounded_channel();
        hub.subscribe(&id, "Ann", ann_tx).await;
        hub.subscribe(&id, "Bob", bob_tx).await;

        hub.notify(&store, &id).await;

        let ann = text_of(ann_rx.try_recv().unwrap());
        let bob = text_of(bob_rx.try_recv().unwrap());
        assert_eq!(ann["type"], "snapshot");
        let word = store.get(&id).unwrap().word.clone();
        assert_eq!(ann["snapshot"]["wordDisplay"], word.as_str());
        assert_eq!(ann["snapshot"]["canDraw"], true);
        assert_eq!(bob["snapshot"]["canDraw"], false);
        assert_ne!(bob["snapshot"]["wordDisplay"], word.as_str());
    }

    #[tokio::test]
    async fn test_missing_room_gets_explicit_signal() {
        let store = RoomStore::new();
        let hub = Hub::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.subscribe("ZZZZZZ", "Ann", tx).await;

        hub.notify(&store, "ZZZZZZ").await;

        let msg = text_of(rx.try_recv().unwrap());
        assert_eq!(msg["type"], "roomMissing");
        assert_eq!(msg["roomId"], "ZZZZZZ");
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let (store, id) = playing_store();
        let hub = Hub::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = hub.subscribe(&id, "Bob", tx).await;
        hub.unsubscribe(&id, token).await;

        hub.notify(&store, &id).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(hub.subscriber_count(&id).await, 0);
    }

    #[tokio::test]
    async fn test_dead_channels_are_pruned() {
        let (store, id) = playing_store();
        let hub = Hub::new();
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        hub.subscribe(&id, "Bob", tx).await;
        assert_eq!(hub.subscriber_count(&id).await, 1);

        hub.notify(&store, &id).await;
        assert_eq!(hub.subscriber_count(&id).await, 0);
    }
}
