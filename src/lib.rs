use wasm_bindgen::prelude::*;

pub mod board;
pub mod config;
pub mod error;
pub mod events;
pub mod game;
pub mod types;
pub mod wasm;

pub use board::{Board, MoveOutcome};
pub use config::{FailedMovePolicy, GameConfig};
pub use error::RulesError;
pub use events::{EventLog, EventSink, GameEvent, LogSink};
pub use game::{Game, Selection, Transition};
pub use types::{Color, Piece, Position, Rank, Winner};

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
