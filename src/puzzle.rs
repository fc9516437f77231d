//! Plain puzzle data as consumed from the text layer.
//!
//! A [`Puzzle`] is nothing more than a tessellation tag and a grid of board
//! characters. Parsing of puzzle files, run-length encoding and collection
//! metadata all live outside this crate; they hand the core a ready-made
//! character grid and get one back from [`BoardGraph::to_board_str`](crate::BoardGraph::to_board_str).

use std::fmt::{Display, Formatter};

use ndarray::Array2;

use crate::location::{index_1d, MAX_HEIGHT, MAX_WIDTH};
use crate::tessellation::Tessellation;

/// Wall character.
pub const WALL: char = '#';
/// Pusher character.
pub const PUSHER: char = '@';
/// Pusher standing on a goal.
pub const PUSHER_ON_GOAL: char = '+';
/// Box character.
pub const BOX: char = '$';
/// Box sitting on a goal.
pub const BOX_ON_GOAL: char = '*';
/// Goal character.
pub const GOAL: char = '.';
/// Invisible floor character.
pub const FLOOR: char = ' ';
/// Visible floor character.
pub const VISIBLE_FLOOR: char = '-';

/// Failure to interpret puzzle data as a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardConversionError {
    /// A character outside the board vocabulary was found.
    #[display("illegal board character '{character}'")]
    IllegalCharacter {
        /// The offending character.
        character: char,
    },
    /// Puzzle dimensions exceed the supported maximum.
    #[display("board of {width}x{height} exceeds maximum of {MAX_WIDTH}x{MAX_HEIGHT}")]
    BoardTooLarge {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },
}

/// True for any pusher character, on or off goal.
pub fn is_pusher(character: char) -> bool {
    matches!(character, PUSHER | 'p' | 'm' | PUSHER_ON_GOAL | 'P' | 'M')
}

/// True for any box character, on or off goal.
pub fn is_box(character: char) -> bool {
    matches!(character, BOX | 'b' | BOX_ON_GOAL | 'B')
}

/// True for any character denoting a goal, including occupied goals.
pub fn is_goal(character: char) -> bool {
    matches!(
        character,
        GOAL | 'o' | BOX_ON_GOAL | 'B' | PUSHER_ON_GOAL | 'P' | 'M'
    )
}

/// True for the wall character.
pub fn is_wall(character: char) -> bool {
    character == WALL
}

/// True for any floor character, visible or not.
pub fn is_empty_floor(character: char) -> bool {
    matches!(character, FLOOR | VISIBLE_FLOOR | '_')
}

/// True for any character in the board vocabulary.
pub fn is_board_character(character: char) -> bool {
    is_wall(character)
        || is_pusher(character)
        || is_box(character)
        || is_goal(character)
        || is_empty_floor(character)
}

/// A tessellation tag plus a `width × height` grid of board characters.
///
/// This is the shape of data the external text layer produces; the core
/// treats the characters as opaque until [`BoardGraph::new`](crate::BoardGraph::new)
/// converts them to [`BoardCell`](crate::BoardCell)s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    tessellation: Tessellation,
    cells: Array2<char>,
}

impl Puzzle {
    /// A `width × height` puzzle of empty floor.
    pub fn new(tessellation: Tessellation, width: usize, height: usize) -> Self {
        Self {
            tessellation,
            cells: Array2::from_elem((height, width), FLOOR),
        }
    }

    /// Builds a puzzle from one string per board row.
    ///
    /// Rows shorter than the longest one are right-padded with floor.
    /// Characters are not validated here; conversion to a board rejects
    /// unknown ones.
    pub fn from_rows(tessellation: Tessellation, rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);

        let mut puzzle = Self::new(tessellation, width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, character) in row.chars().enumerate() {
                puzzle.cells[(y, x)] = character;
            }
        }

        puzzle
    }

    /// Tessellation this puzzle is meant for.
    pub fn tessellation(&self) -> Tessellation {
        self.tessellation
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    /// Number of positions on the board.
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Character at 1D `position`, or `None` off board.
    pub fn get(&self, position: usize) -> Option<char> {
        if self.width() == 0 {
            return None;
        }
        self.cells
            .get((position / self.width(), position % self.width()))
            .copied()
    }

    /// Replaces the character at 1D `position`; off-board positions are
    /// ignored.
    pub fn set(&mut self, position: usize, character: char) {
        if self.width() == 0 {
            return;
        }
        let index = (position / self.width(), position % self.width());
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = character;
        }
    }

    /// Renders the grid as newline-separated rows.
    ///
    /// With `use_visible_floor`, floor cells render as [`VISIBLE_FLOOR`].
    /// Run-length encoding and line wrapping are external formatting
    /// concerns layered on top of this.
    pub fn to_board_str(&self, use_visible_floor: bool) -> String {
        let mut out = String::with_capacity(self.cells.nrows() * (self.cells.ncols() + 1));

        for row in self.cells.rows() {
            for character in row {
                if is_empty_floor(*character) {
                    out.push(if use_visible_floor { VISIBLE_FLOOR } else { FLOOR });
                } else {
                    out.push(*character);
                }
            }
            out.push('\n');
        }

        out
    }

    pub(crate) fn check_dimensions(&self) -> Result<(), BoardConversionError> {
        if self.width() > MAX_WIDTH || self.height() > MAX_HEIGHT {
            return Err(BoardConversionError::BoardTooLarge {
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(())
    }

    pub(crate) fn position(&self, column: usize, row: usize) -> usize {
        index_1d(column, row, self.width())
    }
}

impl Display for Puzzle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_board_str(false))
    }
}
