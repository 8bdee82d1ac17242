use crate::board::{Board, MoveOutcome, mask_positions};
use crate::config::{FailedMovePolicy, GameConfig};
use crate::error::{MoveIssue, Result, RulesError, SelectionIssue};
use crate::events::{EventSink, GameEvent, LogSink};
use crate::types::{Color, GameResult, GameState, Piece, Position, Winner};

/// The piece currently picked up by the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    origin: Position,
    destinations: u64,
}

impl Selection {
    pub fn origin(&self) -> Position {
        self.origin
    }

    /// Destinations that were legal when the piece was selected.
    pub fn destinations(&self) -> Vec<Position> {
        mask_positions(self.destinations)
    }

    fn covers(&self, pos: Position) -> bool {
        pos == self.origin || (self.destinations & pos.bit()) != 0
    }
}

/// What a successful `Game::select_or_move` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Selected {
        at: Position,
        destinations: Vec<Position>,
    },
    Deselected,
    Moved(MoveOutcome),
}

/// One checkers session: board, turn, selection and score.
pub struct Game<S: EventSink = LogSink> {
    board: Board,
    turn: Color,
    selection: Option<Selection>,
    white_score: u32,
    black_score: u32,
    winner: Option<Winner>,
    config: GameConfig,
    sink: S,
}

impl Game<LogSink> {
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        Self::with_sink(config, LogSink)
    }
}

impl Default for Game<LogSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> Game<S> {
    /// Standard opening position, White to move.
    pub fn with_sink(config: GameConfig, sink: S) -> Self {
        Self::from_position(Board::new(), Color::White, config, sink)
    }

    /// Starts a session from an arbitrary position with zero scores.
    pub fn from_position(board: Board, turn: Color, config: GameConfig, sink: S) -> Self {
        Self {
            board,
            turn,
            selection: None,
            white_score: 0,
            black_score: 0,
            winner: None,
            config,
            sink,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn piece_at(&self, row: i32, col: i32) -> Option<Piece> {
        self.board.piece_at(row, col)
    }

    /// Destinations the piece on `(row, col)` may move to under this session's rules.
    /// Off-board or empty squares yield an empty list.
    pub fn legal_destinations_from(&self, row: i32, col: i32) -> Vec<Position> {
        Position::new(row, col)
            .map(|from| mask_positions(self.allowed_destinations(from)))
            .unwrap_or_default()
    }

    /// True for the selected square and every destination offered from it.
    pub fn is_highlighted(&self, row: i32, col: i32) -> bool {
        match (self.selection, Position::new(row, col)) {
            (Some(selection), Some(pos)) => selection.covers(pos),
            _ => false,
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn current_turn(&self) -> Color {
        self.turn
    }

    /// Returns `(white_score, black_score)`.
    pub fn scores(&self) -> (u32, u32) {
        (self.white_score, self.black_score)
    }

    pub fn is_game_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    /// Single entry point for board clicks.
    ///
    /// Without a selection this tries to select `(row, col)`; with one it
    /// deselects (same square) or attempts a move there.
    pub fn select_or_move(&mut self, row: i32, col: i32) -> Result<Transition> {
        if self.is_game_over() {
            return Err(RulesError::GameOver);
        }
        let at = Position::new(row, col).ok_or(RulesError::InvalidCoordinate { row, col })?;

        match self.selection {
            Some(selection) if selection.origin == at => {
                self.clear_selection();
                Ok(Transition::Deselected)
            }
            Some(selection) => self.try_move(selection.origin, at),
            None => self.select(at),
        }
    }

    pub fn clear_selection(&mut self) {
        if self.selection.take().is_some() {
            self.emit(GameEvent::SelectionCleared);
        }
    }

    fn select(&mut self, at: Position) -> Result<Transition> {
        if let Err(reason) = self.check_selectable(at) {
            self.emit(GameEvent::SelectionRejected { at, reason });
            return Err(RulesError::IllegalSelection { at, reason });
        }

        let destinations = self.allowed_destinations(at);
        self.selection = Some(Selection {
            origin: at,
            destinations,
        });

        let destinations = mask_positions(destinations);
        self.emit(GameEvent::SelectionMade {
            color: self.turn,
            at,
            destinations: destinations.clone(),
        });
        Ok(Transition::Selected { at, destinations })
    }

    fn check_selectable(&self, at: Position) -> std::result::Result<(), SelectionIssue> {
        let piece = self.board.get(at).ok_or(SelectionIssue::Empty)?;
        if !piece.is_color(self.turn) {
            return Err(SelectionIssue::OpponentPiece { turn: self.turn });
        }
        if self.config.forced_capture
            && self.board.has_capture(self.turn)
            && self.board.capturing_destinations(at) == 0
        {
            return Err(SelectionIssue::CaptureRequired);
        }
        Ok(())
    }

    /// Legal destinations from `from`, narrowed to captures when forced capture applies.
    fn allowed_destinations(&self, from: Position) -> u64 {
        let Some(piece) = self.board.get(from) else {
            return 0;
        };
        if self.config.forced_capture && self.board.has_capture(piece.color) {
            self.board.capturing_destinations(from)
        } else {
            self.board.valid_destinations(from)
        }
    }

    fn try_move(&mut self, from: Position, to: Position) -> Result<Transition> {
        // Legality is re-derived from the live board, not from the selection.
        if (self.allowed_destinations(from) & to.bit()) == 0 {
            let reason = if (self.board.valid_destinations(from) & to.bit()) != 0 {
                MoveIssue::CaptureRequired
            } else {
                MoveIssue::Unreachable
            };
            return Err(self.reject_move(RulesError::IllegalMove { from, to, reason }));
        }

        let outcome = match self.board.move_piece(from, to) {
            Ok(outcome) => outcome,
            Err(err) => return Err(self.reject_move(err)),
        };

        self.emit(GameEvent::MoveApplied {
            from,
            to,
            promoted: outcome.promoted,
        });
        self.apply_consequences(&outcome);
        self.clear_selection();

        Ok(Transition::Moved(outcome))
    }

    fn reject_move(&mut self, err: RulesError) -> RulesError {
        let (from, to, reason) = match err {
            RulesError::IllegalMove { from, to, reason } => (from, to, reason),
            RulesError::InvariantViolation { from, to } => (from, to, MoveIssue::Unreachable),
            _ => return err,
        };
        self.emit(GameEvent::MoveRejected { from, to, reason });

        if self.config.failed_move == FailedMovePolicy::Clear {
            self.clear_selection();
        }
        err
    }

    /// Scoring, extra turn, turn change and win detection after a move.
    fn apply_consequences(&mut self, outcome: &MoveOutcome) {
        if !outcome.capture_occurred() {
            self.turn = self.turn.opponent();
            self.emit(GameEvent::TurnChanged { color: self.turn });
            return;
        }

        let score = match self.turn {
            Color::White => {
                self.white_score += 1;
                self.white_score
            }
            Color::Black => {
                self.black_score += 1;
                self.black_score
            }
        };
        self.emit(GameEvent::Captured {
            by: self.turn,
            pieces: outcome.captured.len() as u8,
            score,
        });

        if self.board.has_pieces(Color::White) && self.board.has_pieces(Color::Black) {
            self.emit(GameEvent::ExtraTurn { color: self.turn });
        } else {
            let winner = Winner::from_scores(self.white_score, self.black_score);
            self.winner = Some(winner);
            self.emit(GameEvent::GameOver { winner });
        }
    }

    fn emit(&mut self, event: GameEvent) {
        self.sink.notify(&event);
    }

    pub fn to_game_state(&self) -> GameState {
        GameState {
            board: self.board.to_array().to_vec(),
            current_turn: self.turn,
            white_score: self.white_score,
            black_score: self.black_score,
            is_game_over: self.is_game_over(),
            winner: self.winner,
            selected: self.selection.map(|selection| selection.origin),
            destinations: self
                .selection
                .map(|selection| selection.destinations())
                .unwrap_or_default(),
        }
    }

    /// `None` while the game is still running.
    pub fn to_game_result(&self) -> Option<GameResult> {
        let winner = self.winner?;
        Some(GameResult {
            winner,
            white_score: self.white_score,
            black_score: self.black_score,
            white_count: self.board.count(Color::White),
            black_count: self.board.count(Color::Black),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;
    use pretty_assertions::assert_eq;

    fn pos(row: i32, col: i32) -> Position {
        Position::new(row, col).unwrap()
    }

    fn recorded(board: &str, turn: Color, config: GameConfig) -> Game<EventLog> {
        Game::from_position(board.parse().unwrap(), turn, config, EventLog::new())
    }

    fn opening() -> Game<EventLog> {
        Game::with_sink(GameConfig::default(), EventLog::new())
    }

    const WHITE_CAPTURE: &str = "
        ........
        ...b....
        ........
        .b......
        ..w.....
        ........
        ......w.
        ........";

    #[test]
    fn initial_state_is_correct() {
        let game = Game::new();
        let state = game.to_game_state();

        assert_eq!(state.current_turn, Color::White);
        assert_eq!(game.scores(), (0, 0));
        assert!(!state.is_game_over);
        assert_eq!(state.winner, None);
        assert_eq!(state.selected, None);
        assert!(state.destinations.is_empty());
        assert_eq!(state.board.len(), 64);
        assert_eq!(game.to_game_result(), None);
    }

    #[test]
    fn selecting_own_piece_highlights_destinations() {
        let mut game = opening();

        let transition = game.select_or_move(5, 2).unwrap();

        assert_eq!(
            transition,
            Transition::Selected {
                at: pos(5, 2),
                destinations: vec![pos(4, 1), pos(4, 3)],
            }
        );
        assert!(game.is_highlighted(5, 2));
        assert!(game.is_highlighted(4, 1));
        assert!(game.is_highlighted(4, 3));
        assert!(!game.is_highlighted(4, 5));
        assert!(!game.is_highlighted(-1, 0));
    }

    #[test]
    fn selecting_empty_or_opponent_square_is_a_no_op() {
        let mut game = opening();

        assert_eq!(
            game.select_or_move(4, 1),
            Err(RulesError::IllegalSelection {
                at: pos(4, 1),
                reason: SelectionIssue::Empty,
            })
        );
        assert_eq!(
            game.select_or_move(2, 1),
            Err(RulesError::IllegalSelection {
                at: pos(2, 1),
                reason: SelectionIssue::OpponentPiece { turn: Color::White },
            })
        );
        assert!(game.selection().is_none());
        assert_eq!(game.current_turn(), Color::White);
    }

    #[test]
    fn reselecting_origin_deselects() {
        let mut game = opening();
        game.select_or_move(5, 2).unwrap();

        assert_eq!(game.select_or_move(5, 2), Ok(Transition::Deselected));
        assert!(game.selection().is_none());
        assert!(!game.is_highlighted(5, 2));
    }

    #[test]
    fn non_capturing_move_passes_the_turn() {
        let mut game = opening();
        game.select_or_move(5, 2).unwrap();

        let Transition::Moved(outcome) = game.select_or_move(4, 3).unwrap() else {
            panic!("expected a move");
        };

        assert!(!outcome.capture_occurred());
        assert_eq!(game.current_turn(), Color::Black);
        assert!(game.selection().is_none());
        assert_eq!(game.piece_at(4, 3), Some(Piece::WHITE_MAN));
        assert_eq!(game.piece_at(5, 2), None);
    }

    #[test]
    fn capture_scores_and_keeps_the_turn() {
        let mut game = recorded(WHITE_CAPTURE, Color::White, GameConfig::default());
        game.select_or_move(4, 2).unwrap();

        game.select_or_move(2, 0).unwrap();

        assert_eq!(game.scores(), (1, 0));
        assert_eq!(game.current_turn(), Color::White);
        assert!(!game.is_game_over());
        assert_eq!(game.piece_at(3, 1), None);
        assert_eq!(
            game.sink().events()[1..].to_vec(),
            vec![
                GameEvent::MoveApplied {
                    from: pos(4, 2),
                    to: pos(2, 0),
                    promoted: false,
                },
                GameEvent::Captured {
                    by: Color::White,
                    pieces: 1,
                    score: 1,
                },
                GameEvent::ExtraTurn {
                    color: Color::White
                },
                GameEvent::SelectionCleared,
            ]
        );
    }

    #[test]
    fn failed_move_clears_selection_by_default() {
        let mut game = opening();
        game.select_or_move(5, 2).unwrap();
        let board_before = *game.board();

        let err = game.select_or_move(3, 4).unwrap_err();

        assert_eq!(
            err,
            RulesError::IllegalMove {
                from: pos(5, 2),
                to: pos(3, 4),
                reason: MoveIssue::Unreachable,
            }
        );
        assert!(game.selection().is_none());
        assert_eq!(game.current_turn(), Color::White);
        assert_eq!(game.scores(), (0, 0));
        assert_eq!(*game.board(), board_before);
    }

    #[test]
    fn failed_move_retains_selection_when_configured() {
        let config = GameConfig::default().with_failed_move(FailedMovePolicy::Retain);
        let mut game = Game::with_sink(config, EventLog::new());
        game.select_or_move(5, 2).unwrap();

        assert!(game.select_or_move(5, 4).is_err());
        assert_eq!(game.selection().map(Selection::origin), Some(pos(5, 2)));

        game.select_or_move(4, 1).unwrap();
        assert_eq!(game.current_turn(), Color::Black);
    }

    #[test]
    fn capturing_the_last_piece_ends_the_game() {
        let mut game = recorded(
            "........
             ........
             ........
             .b......
             ..w.....
             ........
             ........
             ........",
            Color::White,
            GameConfig::default(),
        );
        game.select_or_move(4, 2).unwrap();
        game.select_or_move(2, 0).unwrap();

        assert!(game.is_game_over());
        assert_eq!(game.winner(), Some(Winner::White));
        assert_eq!(
            game.to_game_result(),
            Some(GameResult {
                winner: Winner::White,
                white_score: 1,
                black_score: 0,
                white_count: 1,
                black_count: 0,
            })
        );
        assert!(game.sink().events().contains(&GameEvent::GameOver {
            winner: Winner::White
        }));
    }

    #[test]
    fn game_over_is_terminal() {
        let mut game = recorded(
            "........
             ........
             ........
             .b......
             ..w.....
             ........
             ........
             ........",
            Color::White,
            GameConfig::default(),
        );
        game.select_or_move(4, 2).unwrap();
        game.select_or_move(2, 0).unwrap();
        let state = game.to_game_state();
        let events = game.sink().events().len();

        assert_eq!(game.select_or_move(2, 0), Err(RulesError::GameOver));
        game.clear_selection();

        assert_eq!(game.to_game_state(), state);
        assert_eq!(game.sink().events().len(), events);
    }

    #[test]
    fn out_of_range_click_changes_nothing() {
        let mut game = opening();
        game.select_or_move(5, 2).unwrap();
        let state = game.to_game_state();

        assert_eq!(
            game.select_or_move(-1, -1),
            Err(RulesError::InvalidCoordinate { row: -1, col: -1 })
        );
        assert_eq!(game.to_game_state(), state);
        assert_eq!(game.piece_at(-1, 8), None);
        assert!(game.legal_destinations_from(8, 8).is_empty());
    }

    #[test]
    fn forced_capture_restricts_selection_and_destinations() {
        let config = GameConfig::default().with_forced_capture(true);
        let mut game = recorded(WHITE_CAPTURE, Color::White, config);

        assert_eq!(
            game.select_or_move(6, 6),
            Err(RulesError::IllegalSelection {
                at: pos(6, 6),
                reason: SelectionIssue::CaptureRequired,
            })
        );
        assert_eq!(game.legal_destinations_from(4, 2), vec![pos(2, 0)]);

        game.select_or_move(4, 2).unwrap();
        assert!(!game.is_highlighted(3, 3));
        game.select_or_move(2, 0).unwrap();
        assert_eq!(game.scores(), (1, 0));
    }

    #[test]
    fn forced_capture_rejects_plain_slide() {
        let config = GameConfig::default()
            .with_forced_capture(true)
            .with_failed_move(FailedMovePolicy::Retain);
        let mut game = recorded(WHITE_CAPTURE, Color::White, config);
        game.select_or_move(4, 2).unwrap();

        assert_eq!(
            game.select_or_move(3, 3),
            Err(RulesError::IllegalMove {
                from: pos(4, 2),
                to: pos(3, 3),
                reason: MoveIssue::CaptureRequired,
            })
        );
        assert_eq!(game.selection().map(Selection::origin), Some(pos(4, 2)));
    }

    #[test]
    fn king_multi_capture_scores_once() {
        let mut game = recorded(
            "........
             ........
             ........
             ........
             ....b...
             ...b....
             ........
             .W....b.",
            Color::White,
            GameConfig::default(),
        );
        game.select_or_move(7, 1).unwrap();

        let Transition::Moved(outcome) = game.select_or_move(3, 5).unwrap() else {
            panic!("expected a move");
        };

        assert_eq!(outcome.captured.len(), 2);
        assert_eq!(game.scores(), (1, 0));
        assert_eq!(game.current_turn(), Color::White);
        assert!(game.sink().events().contains(&GameEvent::Captured {
            by: Color::White,
            pieces: 2,
            score: 1,
        }));
    }
}
