//! Piece identity and manager-mediated movement.

use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;

use crate::graph::{BoardGraph, OffBoardError};
use crate::sokoban_plus::{PlusId, SokobanPlus, SokobanPlusDataError, DEFAULT_PLUS_ID};

/// Identifier of a pusher, box or goal.
pub type PieceId = usize;

/// First ID handed out when scanning a board for pieces.
///
/// Pieces of each kind are numbered from here in row-major board order. Once
/// assigned, an ID survives any amount of manager-mediated movement.
pub const DEFAULT_PIECE_ID: PieceId = 1;

/// Kind of piece a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum PieceKind {
    /// A pusher.
    #[display("pusher")]
    Pusher,
    /// A box.
    #[display("box")]
    Box,
    /// A goal.
    #[display("goal")]
    Goal,
}

/// No piece matches the given ID or position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PieceNotFoundError {
    /// No piece of this kind carries the ID.
    #[display("no {kind} with ID {id}")]
    ById {
        /// Kind of piece looked up.
        kind: PieceKind,
        /// The unknown ID.
        id: PieceId,
    },
    /// No piece of this kind stands on the position.
    #[display("no {kind} on position {position}")]
    OnPosition {
        /// Kind of piece looked up.
        kind: PieceKind,
        /// The empty position.
        position: usize,
    },
}

/// Failure of a manager-mediated piece move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    /// The piece to move doesn't exist.
    #[display("{_0}")]
    PieceNotFound(PieceNotFoundError),
    /// The destination holds a wall, box or pusher.
    #[display("position {position} is occupied by a wall, box or pusher")]
    CellAlreadyOccupied {
        /// The blocked destination.
        position: usize,
    },
    /// The destination is off board.
    #[display("{_0}")]
    OffBoard(OffBoardError),
}

impl From<PieceNotFoundError> for MoveError {
    fn from(error: PieceNotFoundError) -> Self {
        Self::PieceNotFound(error)
    }
}

impl From<OffBoardError> for MoveError {
    fn from(error: OffBoardError) -> Self {
        Self::OffBoard(error)
    }
}

/// Boxes and goals can't switch places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unable to switch boxes and goals; counts are not the same")]
pub struct BoxGoalSwitchError;

/// Snapshot of piece placement: pusher and box positions in piece-ID order,
/// plus the state hash when one was computed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    /// Pusher positions, ordered by pusher ID.
    pub pushers_positions: Vec<usize>,
    /// Box positions, ordered by box ID.
    pub boxes_positions: Vec<usize>,
    /// Zobrist hash of this state, when known.
    pub zobrist_hash: Option<u64>,
}

// ID → position and position → ID, always updated together. The ID side is
// ordered so scans and snapshots come out in assignment order.
#[derive(Debug, Default, Clone)]
struct PieceTable {
    by_id: BTreeMap<PieceId, usize>,
    by_position: HashMap<usize, PieceId>,
}

impl PieceTable {
    fn insert(&mut self, id: PieceId, position: usize) {
        self.by_id.insert(id, position);
        self.by_position.insert(position, id);
    }

    fn len(&self) -> usize {
        self.by_id.len()
    }

    fn ids(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.by_id.keys().copied()
    }

    fn iter(&self) -> impl Iterator<Item = (PieceId, usize)> + '_ {
        self.by_id.iter().map(|(id, position)| (*id, *position))
    }

    fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.by_id.values().copied()
    }

    fn position_of(&self, id: PieceId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    fn id_at(&self, position: usize) -> Option<PieceId> {
        self.by_position.get(&position).copied()
    }

    fn contains_id(&self, id: PieceId) -> bool {
        self.by_id.contains_key(&id)
    }

    fn contains_position(&self, position: usize) -> bool {
        self.by_position.contains_key(&position)
    }

    fn reposition(&mut self, id: PieceId, new_position: usize) {
        if let Some(old_position) = self.by_id.insert(id, new_position) {
            self.by_position.remove(&old_position);
        }
        self.by_position.insert(new_position, id);
    }

    fn remove(&mut self, id: PieceId) -> Option<usize> {
        let position = self.by_id.remove(&id)?;
        self.by_position.remove(&position);
        Some(position)
    }
}

/// Tracks positions of all pushers, boxes and goals on one board.
///
/// The manager assigns a stable [`PieceId`] to every piece by scanning the
/// board once in row-major order, and keeps board cells and its own tables
/// in sync through the `move_*` operations. It implements no game rules;
/// see [`Mover`](crate::Mover) for those.
///
/// Once a board is wrapped by a manager, editing its cells directly
/// desynchronizes the tables; all mutation has to go through the manager.
#[derive(Debug)]
pub struct BoardManager {
    board: BoardGraph,
    pushers: PieceTable,
    boxes: PieceTable,
    goals: PieceTable,
    walls: Vec<usize>,
    sokoban_plus: SokobanPlus,
}

impl BoardManager {
    /// Scans `board` and takes ownership of it.
    pub fn new(board: BoardGraph) -> Self {
        Self::with_plus(board, "", "")
    }

    /// Scans `board`, attaching Sokoban+ order data (initially disabled).
    pub fn with_plus(board: BoardGraph, boxorder: &str, goalorder: &str) -> Self {
        let mut pushers = PieceTable::default();
        let mut boxes = PieceTable::default();
        let mut goals = PieceTable::default();
        let mut walls = Vec::new();

        let mut pusher_id = DEFAULT_PIECE_ID;
        let mut box_id = DEFAULT_PIECE_ID;
        let mut goal_id = DEFAULT_PIECE_ID;

        for position in 0..board.size() {
            let cell = board.cell_at(position);

            if cell.has_pusher() {
                pushers.insert(pusher_id, position);
                pusher_id += 1;
            }
            if cell.has_box() {
                boxes.insert(box_id, position);
                box_id += 1;
            }
            if cell.has_goal() {
                goals.insert(goal_id, position);
                goal_id += 1;
            }
            if cell.is_wall() {
                walls.push(position);
            }
        }

        let sokoban_plus = SokobanPlus::new(boxes.len(), boxorder, goalorder);

        Self {
            board,
            pushers,
            boxes,
            goals,
            walls,
            sokoban_plus,
        }
    }

    /// The managed board.
    pub fn board(&self) -> &BoardGraph {
        &self.board
    }

    /// Releases the board, discarding piece tables.
    pub fn into_board(self) -> BoardGraph {
        self.board
    }

    /// Positions of all walls, cached at construction.
    pub fn walls_positions(&self) -> &[usize] {
        &self.walls
    }

    /// Number of pushers on board.
    pub fn pushers_count(&self) -> usize {
        self.pushers.len()
    }

    /// IDs of all pushers, in assignment order.
    pub fn pushers_ids(&self) -> Vec<PieceId> {
        self.pushers.ids().collect()
    }

    /// All pushers as `(ID, position)`, in ID order.
    pub fn pushers(&self) -> impl Iterator<Item = (PieceId, usize)> + '_ {
        self.pushers.iter()
    }

    /// Position of the pusher with ID `pusher_id`.
    pub fn pusher_position(&self, pusher_id: PieceId) -> Result<usize, PieceNotFoundError> {
        self.pushers
            .position_of(pusher_id)
            .ok_or(PieceNotFoundError::ById {
                kind: PieceKind::Pusher,
                id: pusher_id,
            })
    }

    /// ID of the pusher standing on `position`.
    pub fn pusher_id_on(&self, position: usize) -> Result<PieceId, PieceNotFoundError> {
        self.pushers
            .id_at(position)
            .ok_or(PieceNotFoundError::OnPosition {
                kind: PieceKind::Pusher,
                position,
            })
    }

    /// True if a pusher with ID `pusher_id` exists.
    pub fn has_pusher(&self, pusher_id: PieceId) -> bool {
        self.pushers.contains_id(pusher_id)
    }

    /// True if a pusher stands on `position`.
    pub fn has_pusher_on(&self, position: usize) -> bool {
        self.pushers.contains_position(position)
    }

    /// Moves the pusher standing on `old_position` to `to_new_position`.
    ///
    /// No-op when the positions are equal. The destination must be able to
    /// take a pusher; validation happens before anything is touched.
    pub fn move_pusher_from(
        &mut self,
        old_position: usize,
        to_new_position: usize,
    ) -> Result<(), MoveError> {
        if old_position == to_new_position {
            return Ok(());
        }

        let pusher_id = self.pusher_id_on(old_position)?;
        let destination = *self.board.cell(to_new_position)?;
        if !destination.can_put_pusher_or_box() {
            return Err(MoveError::CellAlreadyOccupied {
                position: to_new_position,
            });
        }

        self.pushers.reposition(pusher_id, to_new_position);
        self.board.cell_at_mut(old_position).remove_pusher();
        self.board.cell_at_mut(to_new_position).put_pusher();

        Ok(())
    }

    /// Moves the pusher with ID `pusher_id` to `to_new_position`.
    pub fn move_pusher(
        &mut self,
        pusher_id: PieceId,
        to_new_position: usize,
    ) -> Result<(), MoveError> {
        let old_position = self.pusher_position(pusher_id)?;
        self.move_pusher_from(old_position, to_new_position)
    }

    /// Number of boxes on board.
    pub fn boxes_count(&self) -> usize {
        self.boxes.len()
    }

    /// IDs of all boxes, in assignment order.
    pub fn boxes_ids(&self) -> Vec<PieceId> {
        self.boxes.ids().collect()
    }

    /// All boxes as `(ID, position)`, in ID order.
    pub fn boxes(&self) -> impl Iterator<Item = (PieceId, usize)> + '_ {
        self.boxes.iter()
    }

    /// Position of the box with ID `box_id`.
    pub fn box_position(&self, box_id: PieceId) -> Result<usize, PieceNotFoundError> {
        self.boxes.position_of(box_id).ok_or(PieceNotFoundError::ById {
            kind: PieceKind::Box,
            id: box_id,
        })
    }

    /// ID of the box sitting on `position`.
    pub fn box_id_on(&self, position: usize) -> Result<PieceId, PieceNotFoundError> {
        self.boxes
            .id_at(position)
            .ok_or(PieceNotFoundError::OnPosition {
                kind: PieceKind::Box,
                position,
            })
    }

    /// True if a box with ID `box_id` exists.
    pub fn has_box(&self, box_id: PieceId) -> bool {
        self.boxes.contains_id(box_id)
    }

    /// True if a box sits on `position`.
    pub fn has_box_on(&self, position: usize) -> bool {
        self.boxes.contains_position(position)
    }

    /// Moves the box sitting on `old_position` to `to_new_position`.
    ///
    /// Same contract as [`move_pusher_from`](Self::move_pusher_from).
    pub fn move_box_from(
        &mut self,
        old_position: usize,
        to_new_position: usize,
    ) -> Result<(), MoveError> {
        if old_position == to_new_position {
            return Ok(());
        }

        let box_id = self.box_id_on(old_position)?;
        let destination = *self.board.cell(to_new_position)?;
        if !destination.can_put_pusher_or_box() {
            return Err(MoveError::CellAlreadyOccupied {
                position: to_new_position,
            });
        }

        self.boxes.reposition(box_id, to_new_position);
        self.board.cell_at_mut(old_position).remove_box();
        self.board.cell_at_mut(to_new_position).put_box();

        Ok(())
    }

    /// Moves the box with ID `box_id` to `to_new_position`.
    pub fn move_box(&mut self, box_id: PieceId, to_new_position: usize) -> Result<(), MoveError> {
        let old_position = self.box_position(box_id)?;
        self.move_box_from(old_position, to_new_position)
    }

    /// Number of goals on board.
    pub fn goals_count(&self) -> usize {
        self.goals.len()
    }

    /// IDs of all goals, in assignment order.
    pub fn goals_ids(&self) -> Vec<PieceId> {
        self.goals.ids().collect()
    }

    /// All goals as `(ID, position)`, in ID order.
    pub fn goals(&self) -> impl Iterator<Item = (PieceId, usize)> + '_ {
        self.goals.iter()
    }

    /// Position of the goal with ID `goal_id`.
    pub fn goal_position(&self, goal_id: PieceId) -> Result<usize, PieceNotFoundError> {
        self.goals.position_of(goal_id).ok_or(PieceNotFoundError::ById {
            kind: PieceKind::Goal,
            id: goal_id,
        })
    }

    /// ID of the goal on `position`.
    pub fn goal_id_on(&self, position: usize) -> Result<PieceId, PieceNotFoundError> {
        self.goals
            .id_at(position)
            .ok_or(PieceNotFoundError::OnPosition {
                kind: PieceKind::Goal,
                position,
            })
    }

    /// True if a goal with ID `goal_id` exists.
    pub fn has_goal(&self, goal_id: PieceId) -> bool {
        self.goals.contains_id(goal_id)
    }

    /// True if `position` is a goal.
    pub fn has_goal_on(&self, position: usize) -> bool {
        self.goals.contains_position(position)
    }

    /// Sokoban+ plus id of the box with ID `box_id`.
    pub fn box_plus_id(&self, box_id: PieceId) -> Result<PlusId, PieceNotFoundError> {
        if !self.has_box(box_id) {
            return Err(PieceNotFoundError::ById {
                kind: PieceKind::Box,
                id: box_id,
            });
        }
        Ok(self
            .sokoban_plus
            .box_plus_id(box_id)
            .unwrap_or(DEFAULT_PLUS_ID))
    }

    /// Sokoban+ plus id of the goal with ID `goal_id`.
    pub fn goal_plus_id(&self, goal_id: PieceId) -> Result<PlusId, PieceNotFoundError> {
        if !self.has_goal(goal_id) {
            return Err(PieceNotFoundError::ById {
                kind: PieceKind::Goal,
                id: goal_id,
            });
        }
        Ok(self
            .sokoban_plus
            .goal_plus_id(goal_id)
            .unwrap_or(DEFAULT_PLUS_ID))
    }

    /// Current Sokoban+ boxorder string.
    pub fn boxorder(&self) -> &str {
        self.sokoban_plus.boxorder()
    }

    /// Current Sokoban+ goalorder string.
    pub fn goalorder(&self) -> &str {
        self.sokoban_plus.goalorder()
    }

    /// Replaces the Sokoban+ boxorder, disabling Sokoban+.
    pub fn set_boxorder(&mut self, boxorder: &str) {
        self.sokoban_plus.set_boxorder(boxorder);
    }

    /// Replaces the Sokoban+ goalorder, disabling Sokoban+.
    pub fn set_goalorder(&mut self, goalorder: &str) {
        self.sokoban_plus.set_goalorder(goalorder);
    }

    /// True when Sokoban+ rules are in force.
    pub fn is_sokoban_plus_enabled(&self) -> bool {
        self.sokoban_plus.is_enabled()
    }

    /// True when the attached Sokoban+ data is valid.
    pub fn is_sokoban_plus_valid(&self) -> bool {
        self.sokoban_plus.is_valid()
    }

    /// Enables Sokoban+ rules, changing the victory condition.
    pub fn enable_sokoban_plus(&mut self) -> Result<(), SokobanPlusDataError> {
        self.sokoban_plus.enable()
    }

    /// Disables Sokoban+ rules.
    pub fn disable_sokoban_plus(&mut self) {
        self.sokoban_plus.disable();
    }

    /// True iff the board has at least one pusher and equally many boxes
    /// and goals (at least one of each).
    pub fn is_playable(&self) -> bool {
        self.pushers_count() > 0
            && self.boxes_count() == self.goals_count()
            && self.boxes_count() > 0
    }

    /// Positional solved check: every box on a goal, and on a goal with the
    /// same plus id when Sokoban+ is enabled.
    pub fn is_solved(&self) -> bool {
        if self.boxes_count() != self.goals_count() {
            return false;
        }

        self.boxes.iter().all(|(box_id, box_position)| {
            self.goal_id_on(box_position)
                .and_then(|goal_id| {
                    Ok(self.box_plus_id(box_id)? == self.goal_plus_id(goal_id)?)
                })
                .unwrap_or(false)
        })
    }

    /// Lazily enumerates every box layout that solves the board.
    ///
    /// The result depends on whether Sokoban+ is enabled. Empty when box and
    /// goal counts differ.
    pub fn solutions(&self) -> Box<dyn Iterator<Item = BoardState> + '_> {
        if self.boxes_count() != self.goals_count() {
            return Box::new(std::iter::empty());
        }

        let goals_positions: Vec<usize> = self.goals.positions().collect();
        let count = goals_positions.len();

        Box::new(
            goals_positions
                .into_iter()
                .permutations(count)
                .filter(|boxes_positions| self.is_valid_solution(boxes_positions))
                .map(|boxes_positions| BoardState {
                    pushers_positions: Vec::new(),
                    boxes_positions,
                    zobrist_hash: None,
                }),
        )
    }

    fn is_valid_solution(&self, boxes_positions: &[usize]) -> bool {
        boxes_positions
            .iter()
            .enumerate()
            .all(|(index, box_position)| {
                let box_id = DEFAULT_PIECE_ID + index;
                self.goal_id_on(*box_position)
                    .and_then(|goal_id| {
                        Ok(self.box_plus_id(box_id)? == self.goal_plus_id(goal_id)?)
                    })
                    .unwrap_or(false)
            })
    }

    // Boxes and goals paired by plus id when Sokoban+ is enabled, by raw ID
    // otherwise; goals are scanned in ID order, each taking the first
    // not-yet-paired compatible box.
    fn box_goal_pairs(&self) -> Vec<(PieceId, PieceId)> {
        if self.boxes_count() != self.goals_count() {
            return Vec::new();
        }

        let plus_enabled = self.is_sokoban_plus_enabled();
        let mut boxes_todo: Vec<PieceId> = self.boxes_ids();
        let mut pairs = Vec::with_capacity(boxes_todo.len());

        for goal_id in self.goals.ids() {
            let index = boxes_todo
                .iter()
                .position(|box_id| {
                    if plus_enabled {
                        self.box_plus_id(*box_id).ok() == self.goal_plus_id(goal_id).ok()
                    } else {
                        *box_id == goal_id
                    }
                })
                .expect("balanced boxes and goals always pair up");
            pairs.push((boxes_todo.remove(index), goal_id));
        }

        pairs
    }

    /// Switches positions of box/goal pairs, for reverse-mode play.
    ///
    /// A pusher standing on a goal that receives a box is lifted off the
    /// board for the swap and ends up on the new goal position (the box's
    /// original cell).
    pub fn switch_boxes_and_goals(&mut self) -> Result<(), BoxGoalSwitchError> {
        if self.boxes_count() != self.goals_count() {
            return Err(BoxGoalSwitchError);
        }

        for (box_id, goal_id) in self.box_goal_pairs() {
            let old_box_position = self.boxes.position_of(box_id).expect("paired box exists");
            let old_goal_position = self.goals.position_of(goal_id).expect("paired goal exists");

            if old_box_position == old_goal_position {
                continue;
            }

            // A pusher on the vacating goal cell has to step aside before
            // the box lands there.
            let displaced_pusher = self.pushers.id_at(old_goal_position);
            if let Some(pusher_id) = displaced_pusher {
                self.pushers.remove(pusher_id);
                self.board.cell_at_mut(old_goal_position).remove_pusher();
            }

            self.goals.reposition(goal_id, old_box_position);
            self.board.cell_at_mut(old_goal_position).remove_goal();
            self.board.cell_at_mut(old_box_position).put_goal();

            self.boxes.reposition(box_id, old_goal_position);
            self.board.cell_at_mut(old_box_position).remove_box();
            self.board.cell_at_mut(old_goal_position).put_box();

            if let Some(pusher_id) = displaced_pusher {
                self.pushers.insert(pusher_id, old_box_position);
                self.board.cell_at_mut(old_box_position).put_pusher();
            }
        }

        Ok(())
    }

    /// Snapshot of current pusher and box positions.
    pub fn state(&self) -> BoardState {
        BoardState {
            pushers_positions: self.pushers.positions().collect(),
            boxes_positions: self.boxes.positions().collect(),
            zobrist_hash: None,
        }
    }
}
