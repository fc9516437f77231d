//! Game rules: on-board movement in forward and reverse solving mode.

use crate::direction::Direction;
use crate::graph::BoardGraph;
use crate::hashed_manager::HashedBoardManager;
use crate::manager::{MoveError, PieceId, PieceNotFoundError, DEFAULT_PIECE_ID};
use crate::step::PusherStep;

/// Direction of solving a puzzle.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum SolvingMode {
    /// Play from the starting layout towards the solved one; the pusher
    /// pushes boxes.
    #[default]
    Forward,
    /// Play from the solved layout backwards; the pusher pulls boxes and
    /// may jump before the first pull.
    Reverse,
}

/// The board doesn't meet the preconditions for play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("board is not playable")]
pub struct NonPlayableBoardError;

/// A movement rule was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum IllegalMoveError {
    /// The pusher would step off the board.
    #[display("pusher ID {pusher_id} can't move {direction:?} off board")]
    PusherOffBoard {
        /// Pusher that would leave the board.
        pusher_id: PieceId,
        /// Attempted direction.
        direction: Direction,
    },
    /// The box in front of the pusher would leave the board.
    #[display("box ID {box_id} can't be pushed {direction:?} off board")]
    BoxOffBoard {
        /// Box that would leave the board.
        box_id: PieceId,
        /// Attempted direction.
        direction: Direction,
    },
    /// The destination cell holds a wall, box or pusher.
    #[display("position {position} is occupied")]
    DestinationBlocked {
        /// The blocked position.
        position: usize,
    },
    /// The destination position doesn't exist.
    #[display("position {position} is off board")]
    OffBoard {
        /// The off-board position.
        position: usize,
    },
    /// Jumps are legal only before the first pull.
    #[display("jumps are not allowed after the first pull")]
    JumpAfterFirstPull,
    /// Jumps are legal only in reverse solving mode.
    #[display("jumps are allowed only in reverse solving mode")]
    JumpInForwardMode,
    /// A push undo was requested with no box behind the pusher.
    #[display("requested push undo, but no box is behind the pusher")]
    UndoWithoutBox,
    /// Undoing a pusher selection found no pusher at the original position.
    #[display("no pusher on position {position}")]
    NoPusherOn {
        /// The pusher-less position.
        position: usize,
    },
}

#[derive(Copy, Clone, Default)]
struct MoveOptions {
    force_pulls: bool,
    increase_pull_count: bool,
    decrease_pull_count: bool,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum StepGroup {
    Moves,
    Jump,
    Selection,
}

/// One play session over a board: implements the actual game rules.
///
/// In [`SolvingMode::Forward`] the pusher pushes a single box at a time and
/// can neither pull nor jump. In [`SolvingMode::Reverse`] the board starts
/// with boxes and goals switched, the pusher pulls boxes (optionally, see
/// [`set_pulls_boxes`](Self::set_pulls_boxes)) and may jump anywhere until
/// the first pull.
///
/// Only the most recent move is kept in [`last_move`](Self::last_move) and
/// only that move can be undone; failed moves and no-ops clear it. The
/// mover owns its board exclusively; editing board cells from outside
/// corrupts its state.
#[derive(Debug)]
pub struct Mover {
    manager: HashedBoardManager,
    solving_mode: SolvingMode,
    pulls_boxes: bool,
    selected_pusher: PieceId,
    pull_count: usize,
    last_move: Vec<PusherStep>,
}

impl Mover {
    /// Starts a forward-mode session over `board`.
    pub fn new(board: BoardGraph) -> Result<Self, NonPlayableBoardError> {
        Self::with_mode(board, SolvingMode::Forward)
    }

    /// Starts a session over `board` in `solving_mode`.
    ///
    /// Reverse mode immediately switches boxes and goals, so movement
    /// starts from the solved layout.
    pub fn with_mode(
        board: BoardGraph,
        solving_mode: SolvingMode,
    ) -> Result<Self, NonPlayableBoardError> {
        Self::with_manager(HashedBoardManager::new(board), solving_mode)
    }

    /// Starts a session over a pre-configured manager, e.g. one carrying
    /// Sokoban+ orders or a custom hash seed.
    pub fn with_manager(
        mut manager: HashedBoardManager,
        solving_mode: SolvingMode,
    ) -> Result<Self, NonPlayableBoardError> {
        if !manager.is_playable() {
            return Err(NonPlayableBoardError);
        }

        if solving_mode == SolvingMode::Reverse {
            manager
                .switch_boxes_and_goals()
                .expect("playable boards have matching box and goal counts");
        }

        Ok(Self {
            manager,
            solving_mode,
            pulls_boxes: true,
            selected_pusher: DEFAULT_PIECE_ID,
            pull_count: 0,
            last_move: Vec::new(),
        })
    }

    /// The board this mover plays on.
    pub fn board(&self) -> &BoardGraph {
        self.manager.board()
    }

    /// The hashed manager driving this session.
    pub fn board_manager(&self) -> &HashedBoardManager {
        &self.manager
    }

    /// Solving mode fixed at construction.
    pub fn solving_mode(&self) -> SolvingMode {
        self.solving_mode
    }

    /// ID of the pusher that performs the next move.
    pub fn selected_pusher(&self) -> PieceId {
        self.selected_pusher
    }

    /// Whether reverse-mode movement drags boxes along.
    pub fn pulls_boxes(&self) -> bool {
        self.pulls_boxes
    }

    /// Makes reverse-mode pulls optional (`false`) or automatic (`true`).
    pub fn set_pulls_boxes(&mut self, pulls_boxes: bool) {
        self.pulls_boxes = pulls_boxes;
    }

    /// Steps of the most recent movement, for replay and undo.
    pub fn last_move(&self) -> &[PusherStep] {
        &self.last_move
    }

    /// Replaces the undo record, e.g. with an externally recorded sequence
    /// that [`undo_last_move`](Self::undo_last_move) should roll back.
    pub fn set_last_move(&mut self, last_move: Vec<PusherStep>) {
        self.last_move = last_move;
    }

    /// Selects the pusher that performs subsequent moves.
    ///
    /// No board mutation happens; the shortest path between the old and new
    /// pusher is recorded as selection steps for animation. Selecting the
    /// already selected pusher is a no-op.
    pub fn select_pusher(&mut self, pusher_id: PieceId) -> Result<(), PieceNotFoundError> {
        if pusher_id == self.selected_pusher {
            return Ok(());
        }

        let old_position = self.selected_pusher_position();
        let new_position = self.manager.pusher_position(pusher_id)?;

        let path = self
            .board()
            .find_jump_path(old_position, new_position)
            .expect("pusher positions are always on board");
        let directions = self
            .board()
            .positions_path_to_directions_path(&path)
            .expect("path positions are always on board");

        self.last_move = directions
            .into_iter()
            .map(PusherStep::new_selection)
            .collect();
        self.selected_pusher = pusher_id;

        Ok(())
    }

    /// Moves the selected pusher one cell in `direction`.
    ///
    /// Forward mode pushes the box in front of the pusher, if any. Reverse
    /// mode pulls the box behind the pusher when pulls are enabled.
    pub fn move_pusher(&mut self, direction: Direction) -> Result<(), IllegalMoveError> {
        match self.solving_mode {
            SolvingMode::Forward => self.push_or_move(direction, MoveOptions::default()),
            SolvingMode::Reverse => self.pull_or_move(
                direction,
                MoveOptions {
                    force_pulls: self.pulls_boxes,
                    increase_pull_count: true,
                    decrease_pull_count: false,
                },
            ),
        }
    }

    /// Teleports the selected pusher to `new_position`.
    ///
    /// Legal only in reverse mode and only before the first pull. Jumping
    /// onto the current position is a no-op. The recorded steps follow the
    /// shortest path so the jump stays expressible as directions.
    pub fn jump(&mut self, new_position: usize) -> Result<(), IllegalMoveError> {
        if self.pull_count != 0 {
            return Err(IllegalMoveError::JumpAfterFirstPull);
        }
        if self.solving_mode != SolvingMode::Reverse {
            return Err(IllegalMoveError::JumpInForwardMode);
        }

        let old_position = self.selected_pusher_position();
        if old_position == new_position {
            return Ok(());
        }

        self.manager
            .move_pusher_from(old_position, new_position)
            .map_err(illegal)?;

        let path = self
            .board()
            .find_jump_path(old_position, new_position)
            .expect("jump endpoints are on board");
        let directions = self
            .board()
            .positions_path_to_directions_path(&path)
            .expect("path positions are always on board");

        let pusher_id = self.selected_pusher;
        self.last_move = directions
            .into_iter()
            .map(|direction| PusherStep::new_jump(direction).with_pusher_id(pusher_id))
            .collect();

        Ok(())
    }

    /// Undoes the movement recorded in [`last_move`](Self::last_move).
    ///
    /// Plain and push/pull steps replay in the opposite direction through
    /// the complementary worker; jump and selection sequences are reversed
    /// and re-invoked. There is no deeper history.
    pub fn undo_last_move(&mut self) -> Result<(), IllegalMoveError> {
        let old_last_move = std::mem::take(&mut self.last_move);
        let mut new_last_move = Vec::new();

        let reversed: Vec<PusherStep> = old_last_move.into_iter().rev().collect();
        let mut index = 0;
        while index < reversed.len() {
            let group = group_of(&reversed[index]);
            let mut end = index + 1;
            while end < reversed.len() && group_of(&reversed[end]) == group {
                end += 1;
            }

            match group {
                StepGroup::Moves => {
                    for step in &reversed[index..end] {
                        self.undo_step(step)?;
                        new_last_move.append(&mut self.last_move);
                    }
                }
                StepGroup::Jump => {
                    self.undo_jump(&reversed[index..end])?;
                    new_last_move.append(&mut self.last_move);
                }
                StepGroup::Selection => {
                    self.undo_selection(&reversed[index..end])?;
                    new_last_move.append(&mut self.last_move);
                }
            }

            index = end;
        }

        self.last_move = new_last_move;
        Ok(())
    }

    fn undo_step(&mut self, step: &PusherStep) -> Result<(), IllegalMoveError> {
        match self.solving_mode {
            SolvingMode::Forward => {
                // A pushed box now sits in front of the pusher, where the
                // push direction points.
                let pusher_position = self.selected_pusher_position();
                let box_position = self
                    .board()
                    .neighbor(pusher_position, step.direction())
                    .expect("pusher position is on board");
                let has_box_in_front =
                    box_position.is_some_and(|position| self.manager.has_box_on(position));

                if !step.is_move() && !has_box_in_front {
                    return Err(IllegalMoveError::UndoWithoutBox);
                }

                self.pull_or_move(
                    step.direction().opposite(),
                    MoveOptions {
                        force_pulls: !step.is_move(),
                        increase_pull_count: false,
                        decrease_pull_count: false,
                    },
                )
            }
            SolvingMode::Reverse => self.push_or_move(
                step.direction().opposite(),
                MoveOptions {
                    force_pulls: false,
                    increase_pull_count: false,
                    decrease_pull_count: true,
                },
            ),
        }
    }

    fn undo_jump(&mut self, steps: &[PusherStep]) -> Result<(), IllegalMoveError> {
        let path: Vec<Direction> = steps.iter().map(|step| step.direction().opposite()).collect();
        let old_position = self.selected_pusher_position();
        let new_position = self
            .board()
            .path_destination(old_position, &path)
            .expect("pusher position is on board");
        self.jump(new_position)
    }

    fn undo_selection(&mut self, steps: &[PusherStep]) -> Result<(), IllegalMoveError> {
        let path: Vec<Direction> = steps.iter().map(|step| step.direction().opposite()).collect();
        let old_position = self.selected_pusher_position();
        let new_position = self
            .board()
            .path_destination(old_position, &path)
            .expect("pusher position is on board");
        let pusher_id = self
            .manager
            .pusher_id_on(new_position)
            .map_err(|_| IllegalMoveError::NoPusherOn {
                position: new_position,
            })?;
        self.select_pusher(pusher_id)
            .map_err(|_| IllegalMoveError::NoPusherOn {
                position: new_position,
            })
    }

    // Forward worker: move the pusher, pushing the box in front of it.
    fn push_or_move(
        &mut self,
        direction: Direction,
        options: MoveOptions,
    ) -> Result<(), IllegalMoveError> {
        let initial_position = self.selected_pusher_position();
        let in_front_of_pusher = self
            .board()
            .neighbor(initial_position, direction)
            .expect("pusher position is on board")
            .ok_or(IllegalMoveError::PusherOffBoard {
                pusher_id: self.selected_pusher,
                direction,
            })?;

        let mut moved_box_id = None;
        if self.manager.has_box_on(in_front_of_pusher) {
            let box_id = self
                .manager
                .box_id_on(in_front_of_pusher)
                .expect("box presence was just checked");
            let in_front_of_box = self
                .board()
                .neighbor(in_front_of_pusher, direction)
                .expect("box position is on board")
                .ok_or(IllegalMoveError::BoxOffBoard { box_id, direction })?;

            self.manager
                .move_box_from(in_front_of_pusher, in_front_of_box)
                .map_err(illegal)?;
            moved_box_id = Some(box_id);
        }

        self.manager
            .move_pusher_from(initial_position, in_front_of_pusher)
            .map_err(illegal)?;

        let step = match moved_box_id {
            Some(box_id) => {
                if options.decrease_pull_count && self.pull_count > 0 {
                    self.pull_count -= 1;
                }
                PusherStep::new_push_or_pull(direction, box_id)
            }
            None => PusherStep::new_move(direction),
        };
        self.last_move = vec![step.with_pusher_id(self.selected_pusher)];

        Ok(())
    }

    // Reverse worker: move the pusher, possibly dragging the box behind it
    // into the vacated cell.
    fn pull_or_move(
        &mut self,
        direction: Direction,
        options: MoveOptions,
    ) -> Result<(), IllegalMoveError> {
        let initial_position = self.selected_pusher_position();
        let in_front_of_pusher = self
            .board()
            .neighbor(initial_position, direction)
            .expect("pusher position is on board")
            .ok_or(IllegalMoveError::PusherOffBoard {
                pusher_id: self.selected_pusher,
                direction,
            })?;

        self.manager
            .move_pusher_from(initial_position, in_front_of_pusher)
            .map_err(illegal)?;

        let mut moved_box_id = None;
        if options.force_pulls {
            let behind_pusher = self
                .board()
                .neighbor(initial_position, direction.opposite())
                .expect("vacated position is on board");
            if let Some(box_position) = behind_pusher {
                if self.manager.has_box_on(box_position) {
                    let box_id = self
                        .manager
                        .box_id_on(box_position)
                        .expect("box presence was just checked");
                    self.manager
                        .move_box_from(box_position, initial_position)
                        .map_err(illegal)?;
                    if options.increase_pull_count {
                        self.pull_count += 1;
                    }
                    moved_box_id = Some(box_id);
                }
            }
        }

        let step = match moved_box_id {
            Some(box_id) => PusherStep::new_push_or_pull(direction, box_id),
            None => PusherStep::new_move(direction),
        };
        self.last_move = vec![step.with_pusher_id(self.selected_pusher)];

        Ok(())
    }

    fn selected_pusher_position(&self) -> usize {
        self.manager
            .pusher_position(self.selected_pusher)
            .expect("selected pusher always exists")
    }
}

fn group_of(step: &PusherStep) -> StepGroup {
    if step.is_jump() {
        StepGroup::Jump
    } else if step.is_pusher_selection() {
        StepGroup::Selection
    } else {
        StepGroup::Moves
    }
}

fn illegal(error: MoveError) -> IllegalMoveError {
    match error {
        MoveError::CellAlreadyOccupied { position } => {
            IllegalMoveError::DestinationBlocked { position }
        }
        MoveError::OffBoard(error) => IllegalMoveError::OffBoard {
            position: error.position,
        },
        MoveError::PieceNotFound(_) => unreachable!("piece presence is checked before moving"),
    }
}
