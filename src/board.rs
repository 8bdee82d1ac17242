use std::fmt;
use std::str::FromStr;

use crate::error::{MoveIssue, Result, RulesError};
use crate::types::{BOARD_SIZE, Color, NUM_SQUARES, Piece, Position, Rank};

const DIAGONALS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const MAN_STEPS: [i32; 2] = [-1, 1];

/// Checkers board state represented by three bitboards.
///
/// `white` and `black` are disjoint; `kings` is a subset of their union.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    white: u64,
    black: u64,
    kings: u64,
}

/// Reason a king's diagonal path is not a legal move.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathBlocked {
    #[error("no piece on the origin square")]
    EmptyOrigin,
    #[error("squares are not on a common diagonal")]
    NotDiagonal,
    #[error("destination is occupied")]
    Occupied,
    #[error("own piece at {0} blocks the path")]
    OwnPiece(Position),
}

/// What a successful `Board::move_piece` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub from: Position,
    pub to: Position,
    /// The piece now standing on `to` (already promoted if `promoted`).
    pub piece: Piece,
    pub captured: Vec<Position>,
    pub promoted: bool,
}

impl MoveOutcome {
    pub fn capture_occurred(&self) -> bool {
        !self.captured.is_empty()
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseBoardError {
    #[error("expected 8 rows, got {0}")]
    RowCount(usize),
    #[error("row {row}: expected 8 squares, got {len}")]
    RowLength { row: usize, len: usize },
    #[error("row {row}: unknown square symbol {symbol:?}")]
    Symbol { row: usize, symbol: char },
}

impl Board {
    /// Creates the initial board:
    /// black men on rows 0-2, white men on rows 5-7, dark squares only.
    pub fn new() -> Self {
        let mut board = Self::empty();
        for index in 0..NUM_SQUARES {
            let pos = Position::from_index(index);
            if (pos.row + pos.col) % 2 == 0 {
                continue;
            }
            if pos.row < 3 {
                board.black |= pos.bit();
            } else if pos.row > 4 {
                board.white |= pos.bit();
            }
        }
        board
    }

    pub fn empty() -> Self {
        Self {
            white: 0,
            black: 0,
            kings: 0,
        }
    }

    /// Builds a board holding exactly `pieces`. Later entries overwrite earlier ones.
    pub fn with_pieces(pieces: &[(Position, Piece)]) -> Self {
        let mut board = Self::empty();
        for &(pos, piece) in pieces {
            board.set_piece(pos, Some(piece));
        }
        board
    }

    pub fn get(&self, pos: Position) -> Option<Piece> {
        let square = pos.bit();
        let color = if (self.white & square) != 0 {
            Color::White
        } else if (self.black & square) != 0 {
            Color::Black
        } else {
            return None;
        };
        let rank = if (self.kings & square) != 0 {
            Rank::King
        } else {
            Rank::Man
        };
        Some(Piece { color, rank })
    }

    /// Same as `get`, but takes raw coordinates; off-board squares read as empty.
    pub fn piece_at(&self, row: i32, col: i32) -> Option<Piece> {
        Position::new(row, col).and_then(|pos| self.get(pos))
    }

    pub(crate) fn set_piece(&mut self, pos: Position, piece: Option<Piece>) {
        let square = pos.bit();
        self.white &= !square;
        self.black &= !square;
        self.kings &= !square;

        if let Some(piece) = piece {
            match piece.color {
                Color::White => self.white |= square,
                Color::Black => self.black |= square,
            }
            if piece.is_king() {
                self.kings |= square;
            }
        }
    }

    fn color_mask(&self, color: Color) -> u64 {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    /// Number of `color` pieces of either rank.
    pub fn count(&self, color: Color) -> u8 {
        self.color_mask(color).count_ones() as u8
    }

    pub fn has_pieces(&self, color: Color) -> bool {
        self.color_mask(color) != 0
    }

    /// Returns the legal destination mask for the piece on `from`.
    /// Empty origin yields 0.
    pub fn valid_destinations(&self, from: Position) -> u64 {
        self.destinations(from).0
    }

    /// Subset of `valid_destinations` whose move removes at least one piece.
    pub fn capturing_destinations(&self, from: Position) -> u64 {
        self.destinations(from).1
    }

    /// Whether any `color` piece has a capturing move.
    pub fn has_capture(&self, color: Color) -> bool {
        mask_positions(self.color_mask(color))
            .into_iter()
            .any(|pos| self.capturing_destinations(pos) != 0)
    }

    /// Mask of `color` pieces with at least one legal destination.
    pub fn movable_pieces(&self, color: Color) -> u64 {
        mask_positions(self.color_mask(color))
            .into_iter()
            .filter(|&pos| self.valid_destinations(pos) != 0)
            .fold(0, |mask, pos| mask | pos.bit())
    }

    /// Returns `(all, capturing)` destination masks.
    fn destinations(&self, from: Position) -> (u64, u64) {
        let Some(piece) = self.get(from) else {
            return (0, 0);
        };

        let mut legal = 0u64;
        let mut captures = 0u64;

        if piece.is_king() {
            for (dr, dc) in DIAGONALS {
                for distance in 1..BOARD_SIZE as i32 {
                    let Some(to) = from.offset(dr * distance, dc * distance) else {
                        break;
                    };
                    if let Ok(captured) = self.scan_diagonal(from, to) {
                        legal |= to.bit();
                        if captured != 0 {
                            captures |= to.bit();
                        }
                    }
                }
            }
        } else {
            let forward = piece.color.forward();
            for dc in MAN_STEPS {
                if let Some(to) = from.offset(forward, dc)
                    && self.get(to).is_none()
                {
                    legal |= to.bit();
                }
            }
            for dc in MAN_STEPS {
                if let Some(to) = from.offset(2 * forward, 2 * dc)
                    && self.is_valid_jump(from, to)
                {
                    legal |= to.bit();
                    captures |= to.bit();
                }
            }
        }

        (legal, captures)
    }

    /// Two-square diagonal hop over an opposing piece onto an empty square.
    pub fn is_valid_jump(&self, from: Position, to: Position) -> bool {
        let Some(piece) = self.get(from) else {
            return false;
        };
        if self.get(to).is_some() {
            return false;
        }
        let Some(middle) = midpoint(from, to) else {
            return false;
        };
        self.get(middle)
            .is_some_and(|jumped| jumped.is_color(piece.color.opponent()))
    }

    /// Scans the squares strictly between `from` and `to`.
    ///
    /// Returns the mask of opposing pieces passed over (0 for a clear slide),
    /// or why the path is not a legal king move. An own piece anywhere on the
    /// path blocks it, regardless of opposing pieces seen before it.
    pub fn scan_diagonal(
        &self,
        from: Position,
        to: Position,
    ) -> std::result::Result<u64, PathBlocked> {
        let piece = self.get(from).ok_or(PathBlocked::EmptyOrigin)?;
        let (dr, dc) = delta(from, to);
        if dr == 0 || dr.abs() != dc.abs() {
            return Err(PathBlocked::NotDiagonal);
        }
        if self.get(to).is_some() {
            return Err(PathBlocked::Occupied);
        }

        let own = self.color_mask(piece.color);
        let opp = self.color_mask(piece.color.opponent());
        let (step_r, step_c) = (dr.signum(), dc.signum());
        let mut captured = 0u64;

        for distance in 1..dr.abs() {
            let Some(square) = from.offset(step_r * distance, step_c * distance) else {
                break;
            };
            let bit = square.bit();
            if (own & bit) != 0 {
                return Err(PathBlocked::OwnPiece(square));
            }
            if (opp & bit) != 0 {
                captured |= bit;
            }
        }

        Ok(captured)
    }

    /// Moves the piece on `from` to `to`, removing captured pieces and
    /// promoting men that reach the far row.
    /// The board is left untouched when an error is returned.
    pub fn move_piece(&mut self, from: Position, to: Position) -> Result<MoveOutcome> {
        let illegal = RulesError::IllegalMove {
            from,
            to,
            reason: MoveIssue::Unreachable,
        };
        let piece = self.get(from).ok_or_else(|| illegal.clone())?;
        if (self.valid_destinations(from) & to.bit()) == 0 {
            return Err(illegal);
        }

        let captured = self
            .captured_by(piece, from, to)
            .ok_or(RulesError::InvariantViolation { from, to })?;

        self.white &= !captured;
        self.black &= !captured;
        self.kings &= !captured;
        self.set_piece(from, None);

        let promoted = piece.rank == Rank::Man && to.row == piece.color.promotion_row();
        let landed = if promoted { piece.promoted() } else { piece };
        self.set_piece(to, Some(landed));

        Ok(MoveOutcome {
            from,
            to,
            piece: landed,
            captured: mask_positions(captured),
            promoted,
        })
    }

    /// Capture mask of an already-enumerated move, or `None` if the board
    /// does not support it.
    fn captured_by(&self, piece: Piece, from: Position, to: Position) -> Option<u64> {
        if piece.is_king() {
            return self.scan_diagonal(from, to).ok();
        }

        let (dr, _) = delta(from, to);
        if dr.abs() != 2 {
            return Some(0);
        }
        let middle = midpoint(from, to)?;
        self.get(middle)
            .filter(|jumped| jumped.is_color(piece.color.opponent()))
            .map(|_| middle.bit())
    }

    /// Converts board to `[u8; 64]` cell codes (see `Piece::code`, 0=empty).
    pub fn to_array(&self) -> [u8; NUM_SQUARES] {
        let mut board = [0u8; NUM_SQUARES];
        for (index, cell) in board.iter_mut().enumerate() {
            *cell = self
                .get(Position::from_index(index))
                .map_or(0, Piece::code);
        }
        board
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Eight lines of `.`/`w`/`b`/`W`/`B`, row 0 first.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_SIZE as i32 {
            for col in 0..BOARD_SIZE as i32 {
                let symbol = self.piece_at(row, col).map_or('.', Piece::symbol);
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let rows: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if rows.len() != BOARD_SIZE {
            return Err(ParseBoardError::RowCount(rows.len()));
        }

        let mut board = Self::empty();
        for (row, line) in rows.into_iter().enumerate() {
            let len = line.chars().count();
            if len != BOARD_SIZE {
                return Err(ParseBoardError::RowLength { row, len });
            }
            for (col, symbol) in line.chars().enumerate() {
                if symbol == '.' {
                    continue;
                }
                let piece =
                    Piece::from_symbol(symbol).ok_or(ParseBoardError::Symbol { row, symbol })?;
                let pos = Position::from_index(row * BOARD_SIZE + col);
                board.set_piece(pos, Some(piece));
            }
        }
        Ok(board)
    }
}

/// Positions of the set bits of `mask`, in ascending index order.
pub fn mask_positions(mask: u64) -> Vec<Position> {
    let mut bits = mask;
    let mut out = Vec::new();

    while bits != 0 {
        out.push(Position::from_index(bits.trailing_zeros() as usize));
        bits &= bits - 1;
    }

    out
}

fn delta(from: Position, to: Position) -> (i32, i32) {
    (
        to.row as i32 - from.row as i32,
        to.col as i32 - from.col as i32,
    )
}

fn midpoint(from: Position, to: Position) -> Option<Position> {
    let (dr, dc) = delta(from, to);
    if dr.abs() != 2 || dc.abs() != 2 {
        return None;
    }
    from.offset(dr / 2, dc / 2)
}
