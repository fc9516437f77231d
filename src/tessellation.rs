//! Board tessellations: the geometry that decides who neighbors whom.

use crate::direction::Direction;
use crate::location::{index_column, index_row, index_1d, is_on_board_2d, MAX_HEIGHT, MAX_WIDTH};
use crate::step::PusherStep;
use crate::manager::DEFAULT_PIECE_ID;

/// Orientation of a board cell, for tessellations where it matters.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum CellOrientation {
    /// Square cells, upward-pointing triangles, hexagons.
    #[default]
    Default,
    /// A downward-pointing triangle on trioban boards.
    TriangleDown,
    /// An octagon cell on octoban boards.
    Octagon,
}

/// Failure in tessellation computations or character conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TessellationError {
    /// The direction is not legal for this tessellation.
    #[display("direction {direction:?} is not legal in {tessellation:?} tessellation")]
    IllegalDirection {
        /// Tessellation the direction was requested for.
        tessellation: Tessellation,
        /// The rejected direction.
        direction: Direction,
    },
    /// Board dimensions are zero or exceed the supported maximum.
    #[display("board dimensions {width}x{height} are invalid")]
    IllegalDimensions {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },
    /// A movement character with no mapping in this tessellation.
    #[display("character '{character}' is not a movement character in {tessellation:?} tessellation")]
    IllegalCharacter {
        /// Tessellation the character was interpreted for.
        tessellation: Tessellation,
        /// The rejected character.
        character: char,
    },
    /// A pusher step that has no movement character in this tessellation.
    #[display("step in direction {direction:?} has no movement character in {tessellation:?} tessellation")]
    IllegalStep {
        /// Tessellation the step was rendered for.
        tessellation: Tessellation,
        /// Direction of the rejected step.
        direction: Direction,
    },
}

/// Supported game tessellations.
///
/// Each variant fixes the legal movement directions, the neighbor geometry,
/// the cell orientation rule and the movement-character alphabet. All
/// variant-specific behavior is dispatched through this enum once at board
/// construction; there is no trait object in the neighbor-computation path.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Tessellation {
    /// Classic Sokoban on a square grid, 4 directions.
    Sokoban,
    /// Hexoban on vertical hexagons, 6 directions; diagonal shifts depend on
    /// row parity.
    Hexoban,
    /// Trioban on alternating triangles, 6 directions; diagonal shifts
    /// depend on triangle orientation. The only variant whose board graph
    /// needs parallel edges.
    Trioban,
    /// Octoban on alternating squares and octagons, 8 directions; diagonals
    /// are legal only from octagon cells.
    Octoban,
}

impl Tessellation {
    /// Directions that are valid in context of this tessellation.
    pub fn legal_directions(self) -> &'static [Direction] {
        match self {
            Self::Sokoban => &[
                Direction::Left,
                Direction::Right,
                Direction::Up,
                Direction::Down,
            ],
            Self::Hexoban | Self::Trioban => &[
                Direction::Left,
                Direction::Right,
                Direction::NorthEast,
                Direction::NorthWest,
                Direction::SouthEast,
                Direction::SouthWest,
            ],
            Self::Octoban => &[
                Direction::Left,
                Direction::Right,
                Direction::Up,
                Direction::Down,
                Direction::NorthEast,
                Direction::NorthWest,
                Direction::SouthEast,
                Direction::SouthWest,
            ],
        }
    }

    /// Neighbor of `position` in `direction` on a `width × height` board.
    ///
    /// Returns `None` when the step would leave the board. Fails when
    /// `direction` is not legal for this tessellation or the dimensions are
    /// out of range.
    pub fn neighbor_position(
        self,
        position: usize,
        direction: Direction,
        width: usize,
        height: usize,
    ) -> Result<Option<usize>, TessellationError> {
        if width == 0 || height == 0 || width > MAX_WIDTH || height > MAX_HEIGHT {
            return Err(TessellationError::IllegalDimensions { width, height });
        }

        let row = index_row(position, width) as isize;
        let column = index_column(position, width) as isize;

        let shift = match self {
            Self::Sokoban => match direction {
                Direction::Up => (0, -1),
                Direction::Down => (0, 1),
                Direction::Left => (-1, 0),
                Direction::Right => (1, 0),
                _ => return Err(self.illegal_direction(direction)),
            },
            Self::Hexoban => {
                // Diagonal column shifts depend on whether the row is even
                // or odd; vertical hexagons interleave columns between rows.
                let even_row = row % 2 == 0;
                match direction {
                    Direction::Left => (-1, 0),
                    Direction::Right => (1, 0),
                    Direction::NorthEast => (if even_row { 0 } else { 1 }, -1),
                    Direction::NorthWest => (if even_row { -1 } else { 0 }, -1),
                    Direction::SouthEast => (if even_row { 0 } else { 1 }, 1),
                    Direction::SouthWest => (if even_row { -1 } else { 0 }, 1),
                    _ => return Err(self.illegal_direction(direction)),
                }
            }
            Self::Trioban => {
                let points_down =
                    self.cell_orientation(position, width, height) == CellOrientation::TriangleDown;
                match direction {
                    Direction::Left => (-1, 0),
                    Direction::Right => (1, 0),
                    Direction::NorthEast => {
                        if points_down {
                            (0, -1)
                        } else {
                            (1, 0)
                        }
                    }
                    Direction::NorthWest => {
                        if points_down {
                            (0, -1)
                        } else {
                            (-1, 0)
                        }
                    }
                    Direction::SouthEast => {
                        if points_down {
                            (1, 0)
                        } else {
                            (0, 1)
                        }
                    }
                    Direction::SouthWest => {
                        if points_down {
                            (-1, 0)
                        } else {
                            (0, 1)
                        }
                    }
                    _ => return Err(self.illegal_direction(direction)),
                }
            }
            Self::Octoban => {
                let diagonal = matches!(
                    direction,
                    Direction::NorthEast
                        | Direction::NorthWest
                        | Direction::SouthEast
                        | Direction::SouthWest
                );
                if diagonal
                    && self.cell_orientation(position, width, height) != CellOrientation::Octagon
                {
                    // Square cells only connect orthogonally.
                    return Ok(None);
                }
                match direction {
                    Direction::Left => (-1, 0),
                    Direction::Right => (1, 0),
                    Direction::Up => (0, -1),
                    Direction::Down => (0, 1),
                    Direction::NorthEast => (1, -1),
                    Direction::NorthWest => (-1, -1),
                    Direction::SouthEast => (1, 1),
                    Direction::SouthWest => (-1, 1),
                }
            }
        };

        let column = column + shift.0;
        let row = row + shift.1;

        if is_on_board_2d(column, row, width, height) {
            Ok(Some(index_1d(column as usize, row as usize, width)))
        } else {
            Ok(None)
        }
    }

    /// Orientation of the cell at `position`.
    ///
    /// Square and hexagonal boards have no orientation concept and always
    /// report [`CellOrientation::Default`].
    pub fn cell_orientation(self, position: usize, width: usize, _height: usize) -> CellOrientation {
        match self {
            Self::Sokoban | Self::Hexoban => CellOrientation::Default,
            Self::Trioban => {
                if Self::orientation_parity(position, width) {
                    CellOrientation::TriangleDown
                } else {
                    CellOrientation::Default
                }
            }
            Self::Octoban => {
                if Self::orientation_parity(position, width) {
                    CellOrientation::Octagon
                } else {
                    CellOrientation::Default
                }
            }
        }
    }

    /// Converts a movement character to a [`PusherStep`].
    ///
    /// Push steps get [`DEFAULT_PIECE_ID`] as a placeholder box ID; the
    /// caller resolves the real ID against its board.
    pub fn char_to_pusher_step(self, character: char) -> Result<PusherStep, TessellationError> {
        let (direction, box_moved) = match (self, character) {
            (_, 'l') => (Direction::Left, false),
            (_, 'L') => (Direction::Left, true),
            (_, 'r') => (Direction::Right, false),
            (_, 'R') => (Direction::Right, true),

            (Self::Sokoban | Self::Octoban, 'u') => (Direction::Up, false),
            (Self::Sokoban | Self::Octoban, 'U') => (Direction::Up, true),
            (Self::Sokoban | Self::Octoban, 'd') => (Direction::Down, false),
            (Self::Sokoban | Self::Octoban, 'D') => (Direction::Down, true),

            (Self::Hexoban | Self::Trioban, 'u') => (Direction::NorthWest, false),
            (Self::Hexoban | Self::Trioban, 'U') => (Direction::NorthWest, true),
            (Self::Hexoban | Self::Trioban, 'd') => (Direction::SouthEast, false),
            (Self::Hexoban | Self::Trioban, 'D') => (Direction::SouthEast, true),

            (Self::Hexoban | Self::Trioban | Self::Octoban, 'n') => (Direction::NorthEast, false),
            (Self::Hexoban | Self::Trioban | Self::Octoban, 'N') => (Direction::NorthEast, true),
            (Self::Hexoban | Self::Trioban | Self::Octoban, 's') => (Direction::SouthWest, false),
            (Self::Hexoban | Self::Trioban | Self::Octoban, 'S') => (Direction::SouthWest, true),

            (Self::Octoban, 'w') => (Direction::NorthWest, false),
            (Self::Octoban, 'W') => (Direction::NorthWest, true),
            (Self::Octoban, 'e') => (Direction::SouthEast, false),
            (Self::Octoban, 'E') => (Direction::SouthEast, true),

            _ => {
                return Err(TessellationError::IllegalCharacter {
                    tessellation: self,
                    character,
                })
            }
        };

        Ok(if box_moved {
            PusherStep::new_push_or_pull(direction, DEFAULT_PIECE_ID)
        } else {
            PusherStep::new_move(direction)
        })
    }

    /// Converts a [`PusherStep`] to its movement character.
    ///
    /// Jump and selection steps render as plain (lowercase) movement
    /// characters.
    pub fn pusher_step_to_char(self, step: &PusherStep) -> Result<char, TessellationError> {
        let direction = step.direction();
        let push = step.is_push_or_pull();

        let character = match (self, direction) {
            (_, Direction::Left) => pick(push, 'L', 'l'),
            (_, Direction::Right) => pick(push, 'R', 'r'),

            (Self::Sokoban | Self::Octoban, Direction::Up) => pick(push, 'U', 'u'),
            (Self::Sokoban | Self::Octoban, Direction::Down) => pick(push, 'D', 'd'),

            (Self::Hexoban | Self::Trioban, Direction::NorthWest) => pick(push, 'U', 'u'),
            (Self::Hexoban | Self::Trioban, Direction::SouthEast) => pick(push, 'D', 'd'),

            (Self::Hexoban | Self::Trioban | Self::Octoban, Direction::NorthEast) => {
                pick(push, 'N', 'n')
            }
            (Self::Hexoban | Self::Trioban | Self::Octoban, Direction::SouthWest) => {
                pick(push, 'S', 's')
            }

            (Self::Octoban, Direction::NorthWest) => pick(push, 'W', 'w'),
            (Self::Octoban, Direction::SouthEast) => pick(push, 'E', 'e'),

            _ => {
                return Err(TessellationError::IllegalStep {
                    tessellation: self,
                    direction,
                })
            }
        };

        Ok(character)
    }

    // Shared parity rule: trioban triangles point down and octoban cells are
    // octagons exactly when (column + row % 2) % 2 == 0.
    fn orientation_parity(position: usize, width: usize) -> bool {
        let row = index_row(position, width);
        let column = index_column(position, width);
        (column + row % 2) % 2 == 0
    }

    fn illegal_direction(self, direction: Direction) -> TessellationError {
        TessellationError::IllegalDirection {
            tessellation: self,
            direction,
        }
    }
}

fn pick(push: bool, push_char: char, move_char: char) -> char {
    if push {
        push_char
    } else {
        move_char
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const ALL: [Tessellation; 4] = [
        Tessellation::Sokoban,
        Tessellation::Hexoban,
        Tessellation::Trioban,
        Tessellation::Octoban,
    ];

    #[test]
    fn sokoban_neighbors() {
        let t = Tessellation::Sokoban;
        // middle of a 3x3 board
        assert_eq!(t.neighbor_position(4, Direction::Up, 3, 3).unwrap(), Some(1));
        assert_eq!(t.neighbor_position(4, Direction::Down, 3, 3).unwrap(), Some(7));
        assert_eq!(t.neighbor_position(4, Direction::Left, 3, 3).unwrap(), Some(3));
        assert_eq!(t.neighbor_position(4, Direction::Right, 3, 3).unwrap(), Some(5));
        // corners step off board
        assert_eq!(t.neighbor_position(0, Direction::Up, 3, 3).unwrap(), None);
        assert_eq!(t.neighbor_position(0, Direction::Left, 3, 3).unwrap(), None);
    }

    #[test]
    fn sokoban_rejects_diagonals() {
        assert!(matches!(
            Tessellation::Sokoban.neighbor_position(0, Direction::NorthEast, 3, 3),
            Err(TessellationError::IllegalDirection { .. })
        ));
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert!(matches!(
            Tessellation::Sokoban.neighbor_position(0, Direction::Up, 0, 3),
            Err(TessellationError::IllegalDimensions { .. })
        ));
        assert!(matches!(
            Tessellation::Sokoban.neighbor_position(0, Direction::Up, 3, MAX_HEIGHT + 1),
            Err(TessellationError::IllegalDimensions { .. })
        ));
    }

    #[test]
    fn hexoban_row_parity() {
        let t = Tessellation::Hexoban;
        // even row: north-east keeps the column
        assert_eq!(t.neighbor_position(9, Direction::NorthEast, 4, 4).unwrap(), Some(5));
        // odd row: north-east shifts the column right
        assert_eq!(t.neighbor_position(5, Direction::NorthEast, 4, 4).unwrap(), Some(2));
        assert!(matches!(
            t.neighbor_position(5, Direction::Up, 4, 4),
            Err(TessellationError::IllegalDirection { .. })
        ));
    }

    #[test]
    fn trioban_orientation_alternates() {
        let t = Tessellation::Trioban;
        assert_eq!(t.cell_orientation(0, 3, 3), CellOrientation::TriangleDown);
        assert_eq!(t.cell_orientation(1, 3, 3), CellOrientation::Default);
        // second row starts with an upward triangle
        assert_eq!(t.cell_orientation(3, 3, 3), CellOrientation::Default);
        assert_eq!(t.cell_orientation(4, 3, 3), CellOrientation::TriangleDown);
    }

    #[test]
    fn trioban_diagonals_depend_on_orientation() {
        let t = Tessellation::Trioban;
        // position 4 on 3x3 points down: north-east goes up a row
        assert_eq!(t.neighbor_position(4, Direction::NorthEast, 3, 3).unwrap(), Some(1));
        // position 1 points up: north-east moves sideways
        assert_eq!(t.neighbor_position(1, Direction::NorthEast, 3, 3).unwrap(), Some(2));
    }

    #[test]
    fn octoban_diagonals_only_from_octagons() {
        let t = Tessellation::Octoban;
        assert_eq!(t.cell_orientation(0, 4, 4), CellOrientation::Octagon);
        assert_eq!(t.cell_orientation(1, 4, 4), CellOrientation::Default);
        assert_eq!(t.neighbor_position(0, Direction::SouthEast, 4, 4).unwrap(), Some(5));
        // square cell: diagonal step goes nowhere
        assert_eq!(t.neighbor_position(1, Direction::SouthEast, 4, 4).unwrap(), None);
        assert_eq!(t.neighbor_position(1, Direction::Down, 4, 4).unwrap(), Some(5));
    }

    #[test]
    fn movement_characters_roundtrip() {
        for tessellation in ALL {
            for direction in tessellation.legal_directions() {
                let step = PusherStep::new_move(*direction);
                let ch = tessellation.pusher_step_to_char(&step).unwrap();
                assert_eq!(tessellation.char_to_pusher_step(ch).unwrap(), step);

                let push = PusherStep::new_push_or_pull(*direction, DEFAULT_PIECE_ID);
                let ch = tessellation.pusher_step_to_char(&push).unwrap();
                assert_eq!(tessellation.char_to_pusher_step(ch).unwrap(), push);
            }
        }
    }

    #[test]
    fn unmapped_characters_fail() {
        assert!(Tessellation::Sokoban.char_to_pusher_step('n').is_err());
        assert!(Tessellation::Hexoban.char_to_pusher_step('w').is_err());
        assert!(Tessellation::Sokoban.char_to_pusher_step('x').is_err());
    }

    proptest! {
        #[test]
        fn neighbor_is_idempotent_with_opposite(
            tessellation_index in 0usize..4,
            position in 0usize..64,
            direction_index in 0usize..8,
            width in 1usize..9,
            height in 1usize..9,
        ) {
            let tessellation = ALL[tessellation_index];
            let directions = tessellation.legal_directions();
            let direction = directions[direction_index % directions.len()];

            prop_assume!(position < width * height);

            if let Some(neighbor) = tessellation
                .neighbor_position(position, direction, width, height)
                .unwrap()
            {
                let back = tessellation
                    .neighbor_position(neighbor, direction.opposite(), width, height)
                    .unwrap();
                prop_assert_eq!(back, Some(position));
            }
        }
    }
}
