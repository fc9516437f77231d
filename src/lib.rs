#![warn(missing_docs)]

//! # `sokograph`
//!
//! A rules engine for [Sokoban](https://en.wikipedia.org/wiki/Sokoban) and its variants on square,
//! hexagonal, triangular and octagonal boards.
//! Begin by handing a character grid ([`Puzzle`]) to [`BoardGraph::new`], then wrap the board in a
//! [`Mover`] and drive play through [`move_pusher`](Mover::move_pusher), [`jump`](Mover::jump),
//! [`select_pusher`](Mover::select_pusher) and [`undo_last_move`](Mover::undo_last_move).
//!
//! Board geometry is encoded by [`Tessellation`], which fixes the legal movement [`Direction`]s,
//! the neighbor rule and the movement-character alphabet of each variant.
//!
//! # Internals
//! The board is one directed graph with a node per position and edges labeled by direction
//! ([`BoardGraph`]); triangular boards connect some cell pairs through two parallel edges.
//! On top of the graph, [`BoardManager`] assigns stable numeric IDs to pushers, boxes and goals by
//! scanning the board once, and keeps its ID tables and the board cells in sync as pieces move.
//! [`HashedBoardManager`] augments the manager with an incrementally maintained 64-bit
//! [Zobrist](https://en.wikipedia.org/wiki/Zobrist_hashing) hash and the set of hashes of all
//! solved layouts, giving external solvers cheap state deduplication and an O(1) solved check.
//! [`Mover`] owns one hashed manager per play session and implements the actual game rules:
//! forward pushes, reverse pulls, jumps before the first pull, pusher selection and single-level
//! undo.
//!
//! Solving, rendering and puzzle file formats are out of scope; the crate consumes and produces
//! plain character grids and [`PusherStep`] sequences.
//!
//! ```
//! use sokograph::{BoardGraph, Direction, Mover, Puzzle, Tessellation};
//!
//! let puzzle = Puzzle::from_rows(Tessellation::Sokoban, &["#####", "#@$.#", "#####"]);
//! let mut mover = Mover::new(BoardGraph::new(&puzzle)?)?;
//!
//! mover.move_pusher(Direction::Right)?;
//! assert!(mover.board_manager().is_solved());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use cell::BoardCell;
pub use direction::Direction;
pub use graph::{BoardGraph, OffBoardError};
pub use hashed_manager::{HashedBoardManager, DEFAULT_HASH_SEED};
pub use manager::{
    BoardManager, BoardState, BoxGoalSwitchError, MoveError, PieceId, PieceKind,
    PieceNotFoundError, DEFAULT_PIECE_ID,
};
pub use mover::{IllegalMoveError, Mover, NonPlayableBoardError, SolvingMode};
pub use puzzle::{BoardConversionError, Puzzle};
pub use sokoban_plus::{PlusId, SokobanPlus, SokobanPlusDataError, DEFAULT_PLUS_ID};
pub use step::PusherStep;
pub use tessellation::{CellOrientation, Tessellation, TessellationError};

pub(crate) mod cell;
mod tests;
pub(crate) mod direction;
pub(crate) mod graph;
pub(crate) mod hashed_manager;
pub mod location;
pub(crate) mod manager;
pub(crate) mod mover;
pub mod puzzle;
pub(crate) mod sokoban_plus;
pub(crate) mod step;
pub(crate) mod tessellation;
