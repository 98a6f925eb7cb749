use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Command rejection categories. Every variant is detected before any
/// room state is mutated; persistence I/O failures never reach callers
/// (they are logged and swallowed by the persistence adapter).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// The referenced room does not exist.
    #[error("room {0} not found")]
    NotFound(String),

    /// The caller is known but not allowed to perform this action.
    #[error("{0}")]
    Policy(String),
}

impl GameError {
    pub fn validation(msg: impl Into<String>) -> Self {
        GameError::Validation(msg.into())
    }

    pub fn policy(msg: impl Into<String>) -> Self {
        GameError::Policy(msg.into())
    }

    /// Stable machine-readable kind, so clients can branch on the
    /// category (retry, prompt re-entry, or abandon the room).
    pub fn kind(&self) -> &'static str {
        match self {
            GameError::Validation(_) => "validation",
            GameError::NotFound(_) => "not_found",
            GameError::Policy(_) => "policy",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            GameError::Validation(_) => StatusCode::BAD_REQUEST,
            GameError::NotFound(_) => StatusCode::NOT_FOUND,
            GameError::Policy(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

pub type GameResult<T> = Result<T, GameError>;
