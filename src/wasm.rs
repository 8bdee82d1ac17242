//! JavaScript surface for a browser UI.
//!
//! The UI converts clicks to board coordinates itself and calls
//! `selectOrMove`; after each call it re-reads `state()` and drains
//! `takeEvents()` for its move log.

use std::fmt::Display;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::GameConfig;
use crate::events::EventLog;
use crate::game::{Game, Transition};
use crate::types::Position;

#[wasm_bindgen]
pub struct CheckersGame {
    game: Game<EventLog>,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum TransitionView {
    Selected {
        at: Position,
        destinations: Vec<Position>,
    },
    Deselected,
    Moved {
        from: Position,
        to: Position,
        captured: Vec<Position>,
        promoted: bool,
    },
}

impl From<Transition> for TransitionView {
    fn from(transition: Transition) -> Self {
        match transition {
            Transition::Selected { at, destinations } => Self::Selected { at, destinations },
            Transition::Deselected => Self::Deselected,
            Transition::Moved(outcome) => Self::Moved {
                from: outcome.from,
                to: outcome.to,
                captured: outcome.captured,
                promoted: outcome.promoted,
            },
        }
    }
}

#[wasm_bindgen]
impl CheckersGame {
    /// `config` may be `undefined`/`null` or a partial `GameConfig` object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<CheckersGame, JsError> {
        let config: GameConfig = if config.is_undefined() || config.is_null() {
            GameConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js_error)?
        };
        Ok(Self {
            game: Game::with_sink(config, EventLog::new()),
        })
    }

    #[wasm_bindgen(js_name = selectOrMove)]
    pub fn select_or_move(&mut self, row: i32, col: i32) -> Result<JsValue, JsError> {
        let transition = self.game.select_or_move(row, col).map_err(to_js_error)?;
        to_js(&TransitionView::from(transition))
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) {
        self.game.clear_selection();
    }

    pub fn state(&self) -> Result<JsValue, JsError> {
        to_js(&self.game.to_game_state())
    }

    /// `null` while the game is running.
    pub fn result(&self) -> Result<JsValue, JsError> {
        to_js(&self.game.to_game_result())
    }

    #[wasm_bindgen(js_name = legalDestinations)]
    pub fn legal_destinations(&self, row: i32, col: i32) -> Result<JsValue, JsError> {
        to_js(&self.game.legal_destinations_from(row, col))
    }

    #[wasm_bindgen(js_name = isHighlighted)]
    pub fn is_highlighted(&self, row: i32, col: i32) -> bool {
        self.game.is_highlighted(row, col)
    }

    #[wasm_bindgen(js_name = takeEvents)]
    pub fn take_events(&mut self) -> Result<JsValue, JsError> {
        let events = self.game.sink_mut().take();
        to_js(&events)
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(to_js_error)
}

fn to_js_error(err: impl Display) -> JsError {
    JsError::new(&err.to_string())
}
