use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{GameError, GameResult};
use crate::room::{Phase, Room};

/// Canvas bounds that stroke points are clamped to.
pub const CANVAS_WIDTH: f64 = 800.0;
pub const CANVAS_HEIGHT: f64 = 600.0;

pub const MIN_BRUSH_SIZE: i64 = 1;
pub const MAX_BRUSH_SIZE: i64 = 24;

/// Retention cap for the stroke log; oldest entries drop first.
pub const MAX_STROKES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeMode {
    /// Freehand polyline; at least two points.
    Stroke,
    /// Whole-canvas flood; carries no points.
    Fill,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub id: Uuid,
    pub mode: StrokeMode,
    pub color: String,
    pub size: u32,
    pub points: Vec<Point>,
}

/// Drawing operation as submitted by a client, before clamping.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeInput {
    pub mode: StrokeMode,
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_size")]
    pub size: i64,
    #[serde(default)]
    pub points: Vec<Point>,
}

fn default_size() -> i64 {
    4
}

/// All stroke log operations require an active round and the caller
/// resolved to the current drawer.
fn require_drawer(room: &Room, username: &str) -> GameResult<()> {
    let name = username.trim();
    if name.is_empty() {
        return Err(GameError::validation("username must not be blank"));
    }
    if room.phase != Phase::Playing {
        return Err(GameError::policy("no round in progress"));
    }
    if !room.is_drawer(name) {
        return Err(GameError::policy("only the drawer may draw"));
    }
    Ok(())
}

fn clamp_point(p: &Point) -> Point {
    Point {
        x: p.x.clamp(0.0, CANVAS_WIDTH),
        y: p.y.clamp(0.0, CANVAS_HEIGHT),
    }
}

pub fn append_stroke(room: &mut Room, username: &str, input: StrokeInput) -> GameResult<()> {
    require_drawer(room, username)?;

    let points = match input.mode {
        StrokeMode::Fill => Vec::new(),
        StrokeMode::Stroke => {
            let points: Vec<Point> = input
                .points
                .iter()
                .filter(|p| p.x.is_finite() && p.y.is_finite())
                .map(clamp_point)
                .collect();
            if points.len() < 2 {
                return Err(GameError::validation(
                    "a stroke needs at least two valid points",
                ));
            }
            points
        }
    };

    room.strokes.push(Stroke {
        id: Uuid::new_v4(),
        mode: input.mode,
        color: input.color,
        size: input.size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE) as u32,
        points,
    });
    if room.strokes.len() > MAX_STROKES {
        let excess = room.strokes.len() - MAX_STROKES;
        room.strokes.drain(..excess);
    }
    Ok(())
}

/// Remove the most recent stroke. Returns whether anything was removed;
/// an empty log is a no-op, not an error.
pub fn undo_last_stroke(room: &mut Room, username: &str) -> GameResult<bool> {
    require_drawer(room, username)?;
    Ok(room.strokes.pop().is_some())
}

pub fn clear_strokes(room: &mut Room, username: &str) -> GameResult<()> {
    require_drawer(room, username)?;
    room.strokes.clear();
    Ok(())
}
