//! Notifications a session emits while it is played.
//!
//! A `Game` owns one `EventSink`. Hosts that only want a log use `LogSink`,
//! which forwards to the `log` facade; UIs that replay events use `EventLog`.

use std::fmt;

use log::{debug, info, warn};
use serde::Serialize;

use crate::error::{MoveIssue, SelectionIssue};
use crate::types::{Color, Position, Winner};

const LOG_TARGET: &str = "checkers";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GameEvent {
    SelectionMade {
        color: Color,
        at: Position,
        destinations: Vec<Position>,
    },
    SelectionRejected {
        at: Position,
        reason: SelectionIssue,
    },
    SelectionCleared,
    MoveApplied {
        from: Position,
        to: Position,
        promoted: bool,
    },
    MoveRejected {
        from: Position,
        to: Position,
        reason: MoveIssue,
    },
    Captured {
        by: Color,
        pieces: u8,
        score: u32,
    },
    ExtraTurn {
        color: Color,
    },
    TurnChanged {
        color: Color,
    },
    GameOver {
        winner: Winner,
    },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectionMade {
                color,
                at,
                destinations,
            } => {
                write!(f, "{color} piece selected at {at}")?;
                if destinations.is_empty() {
                    return f.write_str("; no valid moves available for this piece");
                }
                f.write_str("; valid moves:")?;
                for to in destinations {
                    write!(f, " {to}")?;
                }
                Ok(())
            }
            Self::SelectionRejected { at, reason } => {
                write!(f, "Invalid selection at {at}: {reason}")
            }
            Self::SelectionCleared => f.write_str("Selection cleared"),
            Self::MoveApplied { from, to, promoted } => {
                write!(f, "Move successful: {from} -> {to}")?;
                if *promoted {
                    f.write_str(" (promoted to king)")?;
                }
                Ok(())
            }
            Self::MoveRejected { from, to, reason } => {
                write!(f, "Move failed {from} -> {to}: {reason}")
            }
            Self::Captured { by, pieces, score } => {
                write!(f, "{by} captures {pieces} piece(s)! Score: {score}")
            }
            Self::ExtraTurn { color } => write!(f, "Capture occurred! {color} can move again"),
            Self::TurnChanged { color } => write!(f, "{color}'s turn to play"),
            Self::GameOver { winner } => write!(f, "Game Over! {winner}"),
        }
    }
}

/// Receiver of session notifications.
pub trait EventSink {
    fn notify(&mut self, event: &GameEvent);
}

/// Discards every event.
impl EventSink for () {
    fn notify(&mut self, _event: &GameEvent) {}
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn notify(&mut self, event: &GameEvent) {
        (**self).notify(event);
    }
}

/// Forwards events to the `log` facade under the `checkers` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn notify(&mut self, event: &GameEvent) {
        match event {
            GameEvent::SelectionMade { .. } | GameEvent::SelectionCleared => {
                debug!(target: LOG_TARGET, "{event}");
            }
            GameEvent::SelectionRejected { .. } | GameEvent::MoveRejected { .. } => {
                warn!(target: LOG_TARGET, "{event}");
            }
            _ => info!(target: LOG_TARGET, "{event}"),
        }
    }
}

/// Keeps events in memory until they are taken.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Drains the recorded events, oldest first.
    pub fn take(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for EventLog {
    fn notify(&mut self, event: &GameEvent) {
        self.events.push(event.clone());
    }
}
