use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::snapshot::serialize;
use crate::websocket::message::{ClientMessage, ServerMessage};
use crate::AppState;

/// WebSocket upgrade handler for the push channel.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle one push channel. The client declares a room + viewer pair;
/// from then on every mutation of that room lands here as a fresh
/// snapshot scoped to the declared viewer.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Channel for outgoing messages; the hub writes into it too.
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    // Current registration, replaced if the client re-subscribes.
    let mut registration: Option<(String, Uuid)> = None;

    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Subscribe { room_id, username }) => {
                    if let Some((old_room, token)) = registration.take() {
                        state.hub.unsubscribe(&old_room, token).await;
                    }
                    let token = state.hub.subscribe(&room_id, &username, tx.clone()).await;
                    tracing::info!(room = %room_id, viewer = %username, "channel subscribed");

                    // Immediate reply, then pushes on every mutation.
                    let reply = {
                        let rooms = state.rooms.read().await;
                        match rooms.get(&room_id) {
                            Some(room) => ServerMessage::Snapshot {
                                snapshot: serialize(room, &username),
                            },
                            None => ServerMessage::RoomMissing {
                                room_id: room_id.clone(),
                            },
                        }
                    };
                    let _ = tx.send(reply.to_ws_message());
                    registration = Some((room_id, token));
                }
                Err(e) => {
                    // Malformed input gets an explicit error frame.
                    let reply = ServerMessage::Error {
                        message: format!("unrecognized message: {}", e),
                    };
                    let _ = tx.send(reply.to_ws_message());
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {
                // Ignore binary, ping, pong.
            }
            Err(e) => {
                tracing::warn!(error = %e, "websocket error");
                break;
            }
        }
    }

    if let Some((room_id, token)) = registration {
        state.hub.unsubscribe(&room_id, token).await;
        tracing::info!(room = %room_id, "channel closed");
    }
    send_task.abort();
}
