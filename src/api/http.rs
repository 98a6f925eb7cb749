use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::GameResult;
use crate::game::{guess, round, stroke};
use crate::room::JoinOutcome;
use crate::snapshot::{serialize, RoomSnapshot};
use crate::websocket;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NamePayload {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct GuessPayload {
    pub username: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct StrokePayload {
    pub username: String,
    #[serde(flatten)]
    pub stroke: stroke::StrokeInput,
}

#[derive(Debug, Deserialize)]
pub struct ViewerQuery {
    #[serde(default)]
    pub username: String,
}

/// Join/create responses carry the resolved canonical username so the
/// client adopts the first-seen casing.
#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub username: String,
    pub snapshot: RoomSnapshot,
}

#[derive(Debug, Serialize)]
pub struct Ack {
    pub ok: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/rooms", post(create_room))
        .route("/api/rooms/:room_id", get(fetch_room))
        .route("/api/rooms/:room_id/join", post(join_room))
        .route("/api/rooms/:room_id/start", post(start_round))
        .route("/api/rooms/:room_id/guess", post(submit_guess))
        .route("/api/rooms/:room_id/strokes", post(append_stroke))
        .route("/api/rooms/:room_id/strokes/undo", post(undo_stroke))
        .route("/api/rooms/:room_id/strokes/clear", post(clear_strokes))
        .route("/ws", get(websocket::handler::ws_handler))
        .with_state(state)
}

pub async fn create_room(
    State(state): State<AppState>,
    Json(payload): Json<NamePayload>,
) -> GameResult<Json<JoinResponse>> {
    let (username, snapshot) = {
        let mut rooms = state.rooms.write().await;
        let room = rooms.create_room(&payload.username)?;
        (room.host.clone(), serialize(room, &room.host))
    };
    state.persist();
    Ok(Json(JoinResponse { username, snapshot }))
}

pub async fn join_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(payload): Json<NamePayload>,
) -> GameResult<Json<JoinResponse>> {
    let (outcome, snapshot) = {
        let mut rooms = state.rooms.write().await;
        let outcome = rooms.join_room(&room_id, &payload.username)?;
        let room = rooms.require(&room_id)?;
        (outcome.clone(), serialize(room, outcome.username()))
    };
    // An existing name resolves idempotently; only a real roster
    // change propagates.
    if matches!(outcome, JoinOutcome::Added(_)) {
        state.changed(&room_id).await;
    }
    Ok(Json(JoinResponse {
        username: outcome.username().to_string(),
        snapshot,
    }))
}

pub async fn fetch_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(query): Query<ViewerQuery>,
) -> GameResult<Json<RoomSnapshot>> {
    let rooms = state.rooms.read().await;
    let room = rooms.require(&room_id)?;
    Ok(Json(serialize(room, &query.username)))
}

pub async fn start_round(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(payload): Json<NamePayload>,
) -> GameResult<Json<RoomSnapshot>> {
    let snapshot = {
        let mut rooms = state.rooms.write().await;
        let room = rooms.require_mut(&room_id)?;
        round::start_round(room, &payload.username)?;
        serialize(room, &payload.username)
    };
    state.changed(&room_id).await;
    Ok(Json(snapshot))
}

pub async fn submit_guess(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(payload): Json<GuessPayload>,
) -> GameResult<Json<RoomSnapshot>> {
    let snapshot = {
        let mut rooms = state.rooms.write().await;
        let room = rooms.require_mut(&room_id)?;
        guess::submit_guess(room, &payload.username, &payload.text)?;
        serialize(room, &payload.username)
    };
    state.changed(&room_id).await;
    Ok(Json(snapshot))
}

pub async fn append_stroke(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(payload): Json<StrokePayload>,
) -> GameResult<Json<Ack>> {
    {
        let mut rooms = state.rooms.write().await;
        let room = rooms.require_mut(&room_id)?;
        stroke::append_stroke(room, &payload.username, payload.stroke)?;
    }
    state.changed(&room_id).await;
    Ok(Json(Ack { ok: true }))
}

pub async fn undo_stroke(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(payload): Json<NamePayload>,
) -> GameResult<Json<Ack>> {
    let removed = {
        let mut rooms = state.rooms.write().await;
        let room = rooms.require_mut(&room_id)?;
        stroke::undo_last_stroke(room, &payload.username)?
    };
    if removed {
        state.changed(&room_id).await;
    }
    Ok(Json(Ack { ok: true }))
}

pub async fn clear_strokes(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(payload): Json<NamePayload>,
) -> GameResult<Json<Ack>> {
    {
        let mut rooms = state.rooms.write().await;
        let room = rooms.require_mut(&room_id)?;
        stroke::clear_strokes(room, &payload.username)?;
    }
    state.changed(&room_id).await;
    Ok(Json(Ack { ok: true }))
}
