//! Zobrist hashing on top of the board manager.

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use rand::RngCore;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::graph::BoardGraph;
use crate::manager::{
    BoardManager, BoardState, BoxGoalSwitchError, MoveError, PieceId, PieceNotFoundError,
    DEFAULT_PIECE_ID,
};
use crate::sokoban_plus::{PlusId, SokobanPlusDataError};

/// Seed used when no explicit one is given.
///
/// Any two managers built from equal board layouts with equal seeds produce
/// bit-for-bit equal hashes.
pub const DEFAULT_HASH_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// [`BoardManager`] that additionally maintains a 64-bit Zobrist hash of the
/// board state.
///
/// One random factor exists per (box equivalence class, position) and one
/// per position for pushers; the state hash is the XOR of a base factor with
/// the factors of every occupied position. Moving a piece updates the hash
/// with two XORs, so undoing a move restores the previous hash exactly.
///
/// Boxes sharing a Sokoban+ plus id hash identically, so swapping two of
/// them leaves the hash unchanged; the same goes for pushers, which are all
/// interchangeable. Enabling or disabling Sokoban+ changes the equivalence
/// classes and therefore re-hashes from scratch.
///
/// The set of hashes of all solved box layouts is precomputed lazily, which
/// turns [`is_solved`](Self::is_solved) into a set-membership check.
#[derive(Debug)]
pub struct HashedBoardManager {
    manager: BoardManager,
    seed: u64,
    initial_state_hash: u64,
    state_hash: u64,
    boxes_hash: u64,
    pushers_factors: Vec<u64>,
    boxes_factors: BTreeMap<PlusId, Vec<u64>>,
    solutions_hashes: OnceCell<HashSet<u64>>,
}

impl HashedBoardManager {
    /// Scans `board` and hashes it with [`DEFAULT_HASH_SEED`].
    pub fn new(board: BoardGraph) -> Self {
        Self::with_seed(board, DEFAULT_HASH_SEED)
    }

    /// Scans `board` and hashes it with an explicit factor-generation seed.
    pub fn with_seed(board: BoardGraph, seed: u64) -> Self {
        Self::from_manager(BoardManager::new(board), seed)
    }

    /// Scans `board` with Sokoban+ order data attached, hashing with
    /// [`DEFAULT_HASH_SEED`].
    pub fn with_plus(board: BoardGraph, boxorder: &str, goalorder: &str) -> Self {
        Self::from_manager(BoardManager::with_plus(board, boxorder, goalorder), DEFAULT_HASH_SEED)
    }

    fn from_manager(manager: BoardManager, seed: u64) -> Self {
        let mut hashed = Self {
            manager,
            seed,
            initial_state_hash: 0,
            state_hash: 0,
            boxes_hash: 0,
            pushers_factors: Vec::new(),
            boxes_factors: BTreeMap::new(),
            solutions_hashes: OnceCell::new(),
        };
        hashed.rehash();
        hashed
    }

    /// Read access to the wrapped manager.
    ///
    /// All mutation goes through this type so the hash stays in sync.
    pub fn manager(&self) -> &BoardManager {
        &self.manager
    }

    /// The managed board.
    pub fn board(&self) -> &BoardGraph {
        self.manager.board()
    }

    /// Releases the board, discarding piece tables and hash state.
    pub fn into_board(self) -> BoardGraph {
        self.manager.into_board()
    }

    /// Zobrist hash of the current board state.
    pub fn state_hash(&self) -> u64 {
        self.state_hash
    }

    /// Zobrist hash of the initial board state, before any movement.
    pub fn initial_state_hash(&self) -> u64 {
        self.initial_state_hash
    }

    /// Hash the board would have with boxes placed on `boxes_positions`
    /// (indexed by box ID), without mutating anything.
    ///
    /// `None` when the layout doesn't cover exactly the board's boxes and
    /// goals, or names an off-board position.
    pub fn external_state_hash(&self, boxes_positions: &[usize]) -> Option<u64> {
        if boxes_positions.len() != self.manager.boxes_count()
            || boxes_positions.len() != self.manager.goals_count()
        {
            return None;
        }

        let mut hash = self.initial_state_hash;
        for (index, box_position) in boxes_positions.iter().enumerate() {
            let plus_id = self
                .manager
                .box_plus_id(DEFAULT_PIECE_ID + index)
                .expect("layout length equals box count");
            hash ^= self.boxes_factors[&plus_id].get(*box_position)?;
        }

        Some(hash)
    }

    /// Hashes of every solved box layout, computed on first use.
    pub fn solutions_hashes(&self) -> &HashSet<u64> {
        self.solutions_hashes.get_or_init(|| {
            self.manager
                .solutions()
                .filter_map(|solution| self.external_state_hash(&solution.boxes_positions))
                .collect()
        })
    }

    /// O(1) solved check: membership of the current box layout's hash in
    /// the precomputed solved-hash set.
    pub fn is_solved(&self) -> bool {
        self.solutions_hashes().contains(&self.boxes_hash)
    }

    /// Snapshot of the current state, carrying the state hash.
    pub fn state(&self) -> BoardState {
        let mut state = self.manager.state();
        state.zobrist_hash = Some(self.state_hash);
        state
    }

    /// Moves a pusher and updates the hash incrementally.
    pub fn move_pusher_from(
        &mut self,
        old_position: usize,
        to_new_position: usize,
    ) -> Result<(), MoveError> {
        self.manager.move_pusher_from(old_position, to_new_position)?;
        if old_position != to_new_position {
            self.state_hash ^=
                self.pushers_factors[old_position] ^ self.pushers_factors[to_new_position];
        }
        Ok(())
    }

    /// Moves the pusher with ID `pusher_id`, updating the hash.
    pub fn move_pusher(
        &mut self,
        pusher_id: PieceId,
        to_new_position: usize,
    ) -> Result<(), MoveError> {
        let old_position = self.manager.pusher_position(pusher_id)?;
        self.move_pusher_from(old_position, to_new_position)
    }

    /// Moves a box and updates the hash incrementally.
    pub fn move_box_from(
        &mut self,
        old_position: usize,
        to_new_position: usize,
    ) -> Result<(), MoveError> {
        self.manager.move_box_from(old_position, to_new_position)?;
        if old_position != to_new_position {
            let box_id = self
                .manager
                .box_id_on(to_new_position)
                .expect("box was just moved here");
            let plus_id = self.manager.box_plus_id(box_id).expect("box id from own table");
            let factors = &self.boxes_factors[&plus_id];
            let delta = factors[old_position] ^ factors[to_new_position];
            self.state_hash ^= delta;
            self.boxes_hash ^= delta;
        }
        Ok(())
    }

    /// Moves the box with ID `box_id`, updating the hash.
    pub fn move_box(&mut self, box_id: PieceId, to_new_position: usize) -> Result<(), MoveError> {
        let old_position = self.manager.box_position(box_id)?;
        self.move_box_from(old_position, to_new_position)
    }

    /// Switches box/goal pairs and brings the hash back in sync.
    pub fn switch_boxes_and_goals(&mut self) -> Result<(), BoxGoalSwitchError> {
        self.manager.switch_boxes_and_goals()?;
        self.recompute_hashes();
        Ok(())
    }

    /// Replaces the Sokoban+ boxorder; re-hashes when this flips the
    /// enabled state.
    pub fn set_boxorder(&mut self, boxorder: &str) {
        let was_enabled = self.manager.is_sokoban_plus_enabled();
        self.manager.set_boxorder(boxorder);
        self.after_plus_change(was_enabled);
    }

    /// Replaces the Sokoban+ goalorder; re-hashes when this flips the
    /// enabled state.
    pub fn set_goalorder(&mut self, goalorder: &str) {
        let was_enabled = self.manager.is_sokoban_plus_enabled();
        self.manager.set_goalorder(goalorder);
        self.after_plus_change(was_enabled);
    }

    /// Enables Sokoban+; box equivalence classes change, so the board is
    /// re-hashed and the solved-hash set discarded.
    pub fn enable_sokoban_plus(&mut self) -> Result<(), SokobanPlusDataError> {
        let was_enabled = self.manager.is_sokoban_plus_enabled();
        self.manager.enable_sokoban_plus()?;
        self.after_plus_change(was_enabled);
        Ok(())
    }

    /// Disables Sokoban+, re-hashing when it was enabled.
    pub fn disable_sokoban_plus(&mut self) {
        let was_enabled = self.manager.is_sokoban_plus_enabled();
        self.manager.disable_sokoban_plus();
        self.after_plus_change(was_enabled);
    }

    /// Position of the pusher with ID `pusher_id`.
    pub fn pusher_position(&self, pusher_id: PieceId) -> Result<usize, PieceNotFoundError> {
        self.manager.pusher_position(pusher_id)
    }

    /// ID of the pusher standing on `position`.
    pub fn pusher_id_on(&self, position: usize) -> Result<PieceId, PieceNotFoundError> {
        self.manager.pusher_id_on(position)
    }

    /// True if a box sits on `position`.
    pub fn has_box_on(&self, position: usize) -> bool {
        self.manager.has_box_on(position)
    }

    /// ID of the box sitting on `position`.
    pub fn box_id_on(&self, position: usize) -> Result<PieceId, PieceNotFoundError> {
        self.manager.box_id_on(position)
    }

    /// True iff the wrapped board is playable.
    pub fn is_playable(&self) -> bool {
        self.manager.is_playable()
    }

    fn after_plus_change(&mut self, was_enabled: bool) {
        if was_enabled != self.manager.is_sokoban_plus_enabled() {
            self.solutions_hashes = OnceCell::new();
            self.rehash();
        }
    }

    // Regenerates every random factor from the seed, then recomputes the
    // hashes. Wall positions get zero factors; nothing ever occupies them.
    fn rehash(&mut self) {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let distinct_plus_ids: BTreeSet<PlusId> = self
            .manager
            .boxes_ids()
            .into_iter()
            .map(|box_id| {
                self.manager
                    .box_plus_id(box_id)
                    .expect("box ids from own table")
            })
            .collect();

        self.initial_state_hash = rng.next_u64();

        let walls: HashSet<usize> = self.manager.walls_positions().iter().copied().collect();
        let size = self.manager.board().size();
        let factor_row = |rng: &mut ChaCha8Rng| -> Vec<u64> {
            (0..size)
                .map(|position| {
                    if walls.contains(&position) {
                        0
                    } else {
                        rng.next_u64()
                    }
                })
                .collect()
        };

        self.boxes_factors = distinct_plus_ids
            .into_iter()
            .map(|plus_id| (plus_id, factor_row(&mut rng)))
            .collect();
        self.pushers_factors = factor_row(&mut rng);

        self.recompute_hashes();
    }

    // Recomputes both hashes from current piece positions with the existing
    // factor tables.
    fn recompute_hashes(&mut self) {
        let mut boxes_hash = self.initial_state_hash;
        for (box_id, box_position) in self.manager.boxes() {
            let plus_id = self
                .manager
                .box_plus_id(box_id)
                .expect("box ids from own table");
            boxes_hash ^= self.boxes_factors[&plus_id][box_position];
        }

        let mut state_hash = boxes_hash;
        for (_, pusher_position) in self.manager.pushers() {
            state_hash ^= self.pushers_factors[pusher_position];
        }

        self.boxes_hash = boxes_hash;
        self.state_hash = state_hash;
    }
}
