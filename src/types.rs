use std::fmt;

use serde::{Deserialize, Serialize};

pub const BOARD_SIZE: usize = 8;
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;

/// Side of a piece or player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Row step a man of this color moves along.
    pub fn forward(self) -> i32 {
        match self {
            Self::White => -1,
            Self::Black => 1,
        }
    }

    /// Row on which a man of this color is promoted.
    pub fn promotion_row(self) -> u8 {
        match self {
            Self::White => 0,
            Self::Black => BOARD_SIZE as u8 - 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => f.write_str("White"),
            Self::Black => f.write_str("Black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Man,
    King,
}

/// A piece on the board. Empty cells are `None` wherever a cell is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub rank: Rank,
}

impl Piece {
    pub const WHITE_MAN: Self = Self::man(Color::White);
    pub const BLACK_MAN: Self = Self::man(Color::Black);
    pub const WHITE_KING: Self = Self::king(Color::White);
    pub const BLACK_KING: Self = Self::king(Color::Black);

    pub const fn man(color: Color) -> Self {
        Self {
            color,
            rank: Rank::Man,
        }
    }

    pub const fn king(color: Color) -> Self {
        Self {
            color,
            rank: Rank::King,
        }
    }

    pub fn is_color(self, color: Color) -> bool {
        self.color == color
    }

    pub fn is_king(self) -> bool {
        self.rank == Rank::King
    }

    pub fn promoted(self) -> Self {
        Self::king(self.color)
    }

    /// Cell code used in snapshots: 1=white man, 2=black man, 3=white king, 4=black king.
    pub fn code(self) -> u8 {
        match (self.color, self.rank) {
            (Color::White, Rank::Man) => 1,
            (Color::Black, Rank::Man) => 2,
            (Color::White, Rank::King) => 3,
            (Color::Black, Rank::King) => 4,
        }
    }

    /// Diagram character: `w`/`b` for men, `W`/`B` for kings.
    pub fn symbol(self) -> char {
        match (self.color, self.rank) {
            (Color::White, Rank::Man) => 'w',
            (Color::Black, Rank::Man) => 'b',
            (Color::White, Rank::King) => 'W',
            (Color::Black, Rank::King) => 'B',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'w' => Some(Self::WHITE_MAN),
            'b' => Some(Self::BLACK_MAN),
            'W' => Some(Self::WHITE_KING),
            'B' => Some(Self::BLACK_KING),
            _ => None,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rank {
            Rank::Man => write!(f, "{}", self.color),
            Rank::King => write!(f, "{} King", self.color),
        }
    }
}

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    /// Returns `None` when `(row, col)` is outside the board.
    pub fn new(row: i32, col: i32) -> Option<Self> {
        if in_bounds(row, col) {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Caller contract: `index < 64`.
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index < NUM_SQUARES);
        Self {
            row: (index / BOARD_SIZE) as u8,
            col: (index % BOARD_SIZE) as u8,
        }
    }

    pub fn index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    pub(crate) fn bit(self) -> u64 {
        1u64 << self.index()
    }

    /// The square `(dr, dc)` away, if it is still on the board.
    pub fn offset(self, dr: i32, dc: i32) -> Option<Self> {
        Self::new(self.row as i32 + dr, self.col as i32 + dc)
    }
}

/// Board notation: column letter A-H, then rank `8 - row`.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'A' + self.col) as char;
        write!(f, "{}{}", file, BOARD_SIZE as u8 - self.row)
    }
}

pub(crate) fn in_bounds(row: i32, col: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col)
}

/// Final verdict once one side has no pieces left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    White,
    Black,
    Tie,
}

impl Winner {
    pub fn from_scores(white_score: u32, black_score: u32) -> Self {
        if white_score > black_score {
            Self::White
        } else if black_score > white_score {
            Self::Black
        } else {
            Self::Tie
        }
    }

    pub fn color(self) -> Option<Color> {
        match self {
            Self::White => Some(Color::White),
            Self::Black => Some(Color::Black),
            Self::Tie => None,
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => f.write_str("White Player Wins!"),
            Self::Black => f.write_str("Black Player Wins!"),
            Self::Tie => f.write_str("It's a Tie!"),
        }
    }
}

/// Public game state returned from WASM APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// 64 cell codes, row-major: 0=empty, 1=white man, 2=black man, 3=white king, 4=black king.
    pub board: Vec<u8>,
    pub current_turn: Color,
    pub white_score: u32,
    pub black_score: u32,
    pub is_game_over: bool,
    pub winner: Option<Winner>,
    pub selected: Option<Position>,
    /// Contract:
    /// - With a selection: destinations legal from it.
    /// - Without a selection: must be an empty list.
    pub destinations: Vec<Position>,
}

/// Final result after game over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub winner: Winner,
    pub white_score: u32,
    pub black_score: u32,
    pub white_count: u8,
    pub black_count: u8,
}
