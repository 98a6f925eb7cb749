pub mod api;
pub mod error;
pub mod game;
pub mod persist;
pub mod realtime;
pub mod room;
pub mod snapshot;
pub mod websocket;
pub mod words;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use persist::{Debouncer, Storage};
use realtime::Hub;
use room::RoomStore;

/// Mutations within this window coalesce into one disk write.
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(100);

/// Application state shared across all connections. Built once per
/// process (or per test, with a fresh store).
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RwLock<RoomStore>>,
    pub hub: Hub,
    persistence: Debouncer,
}

impl AppState {
    pub fn new(store: RoomStore, storage: Storage) -> Self {
        let rooms = Arc::new(RwLock::new(store));
        let persistence = {
            let rooms = Arc::clone(&rooms);
            Debouncer::spawn(SAVE_DEBOUNCE, move || {
                let rooms = Arc::clone(&rooms);
                let storage = storage.clone();
                async move {
                    // Clone under the lock, write off the runtime so a
                    // slow disk cannot stall the worker threads.
                    let snapshot = rooms.read().await.clone();
                    let result =
                        tokio::task::spawn_blocking(move || storage.save(&snapshot)).await;
                    // Persistence is a durability aid only; failures
                    // are logged and the engine keeps serving.
                    match result {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => tracing::warn!(error = %e, "failed to persist rooms"),
                        Err(e) => tracing::warn!(error = %e, "persistence task failed"),
                    }
                }
            })
        };
        Self {
            rooms,
            hub: Hub::new(),
            persistence,
        }
    }

    /// Schedule a debounced write of the whole store.
    pub fn persist(&self) {
        self.persistence.schedule();
    }

    /// Side effects of a completed mutation: schedule persistence and
    /// fan the new state out to every subscriber of the room.
    pub async fn changed(&self, room_id: &str) {
        self.persist();
        let rooms = self.rooms.read().await;
        self.hub.notify(&rooms, room_id).await;
    }
}
