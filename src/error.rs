use serde::Serialize;

use crate::types::{Color, Position};

/// Why a square could not be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionIssue {
    Empty,
    OpponentPiece { turn: Color },
    CaptureRequired,
}

impl std::fmt::Display for SelectionIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("square is empty"),
            Self::OpponentPiece { turn } => write!(f, "it's {turn}'s turn"),
            Self::CaptureRequired => f.write_str("another piece must capture"),
        }
    }
}

/// Why a destination was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveIssue {
    Unreachable,
    CaptureRequired,
}

impl std::fmt::Display for MoveIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreachable => f.write_str("not in list of valid moves"),
            Self::CaptureRequired => f.write_str("a capture is available"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("position ({row}, {col}) is outside the board")]
    InvalidCoordinate { row: i32, col: i32 },
    #[error("invalid selection at {at}: {reason}")]
    IllegalSelection { at: Position, reason: SelectionIssue },
    #[error("invalid move {from} -> {to}: {reason}")]
    IllegalMove {
        from: Position,
        to: Position,
        reason: MoveIssue,
    },
    #[error("game is already over")]
    GameOver,
    #[error("board could not apply accepted move {from} -> {to}")]
    InvariantViolation { from: Position, to: Position },
}

pub type Result<T> = std::result::Result<T, RulesError>;
