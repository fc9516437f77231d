//! Atomic records of pusher movement.

use crate::direction::Direction;
use crate::manager::{PieceId, DEFAULT_PIECE_ID};

/// What a single [`PusherStep`] did, besides moving the pusher.
///
/// A step is exactly one of these at a time; there is no way to build a step
/// that is both a jump and a push.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
enum StepKind {
    /// Plain movement, no box involved.
    Move,
    /// A box was pushed (forward mode) or pulled (reverse mode).
    PushOrPull { box_id: PieceId },
    /// Part of a jump sequence in reverse solving mode.
    Jump,
    /// Part of a pusher-selection sequence on multi-pusher boards.
    Selection,
}

/// Single step of pusher movement.
///
/// Steps are produced by [`Mover`](crate::Mover) as its movement record and
/// consumed by external animation/replay layers. A step is a plain move, a
/// push/pull, part of a jump, or part of a pusher selection.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PusherStep {
    direction: Direction,
    pusher_id: PieceId,
    kind: StepKind,
}

impl PusherStep {
    /// A plain movement step.
    pub fn new_move(direction: Direction) -> Self {
        Self {
            direction,
            pusher_id: DEFAULT_PIECE_ID,
            kind: StepKind::Move,
        }
    }

    /// A step that moved the box with ID `box_id`.
    pub fn new_push_or_pull(direction: Direction, box_id: PieceId) -> Self {
        Self {
            direction,
            pusher_id: DEFAULT_PIECE_ID,
            kind: StepKind::PushOrPull { box_id },
        }
    }

    /// A step that is part of a jump sequence.
    pub fn new_jump(direction: Direction) -> Self {
        Self {
            direction,
            pusher_id: DEFAULT_PIECE_ID,
            kind: StepKind::Jump,
        }
    }

    /// A step that is part of a pusher-selection sequence.
    pub fn new_selection(direction: Direction) -> Self {
        Self {
            direction,
            pusher_id: DEFAULT_PIECE_ID,
            kind: StepKind::Selection,
        }
    }

    /// Same step, attributed to the pusher with ID `pusher_id`.
    pub fn with_pusher_id(mut self, pusher_id: PieceId) -> Self {
        self.pusher_id = pusher_id;
        self
    }

    /// Direction of this step.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// ID of the pusher that performed this step.
    pub fn pusher_id(&self) -> PieceId {
        self.pusher_id
    }

    /// ID of the box this step moved, if any.
    pub fn moved_box_id(&self) -> Option<PieceId> {
        match self.kind {
            StepKind::PushOrPull { box_id } => Some(box_id),
            _ => None,
        }
    }

    /// True for plain movement: no box, no jump, no selection.
    pub fn is_move(&self) -> bool {
        self.kind == StepKind::Move
    }

    /// True if this step moved a box.
    pub fn is_push_or_pull(&self) -> bool {
        matches!(self.kind, StepKind::PushOrPull { .. })
    }

    /// True if this step is part of a jump sequence.
    pub fn is_jump(&self) -> bool {
        self.kind == StepKind::Jump
    }

    /// True if this step is part of a pusher-selection sequence.
    pub fn is_pusher_selection(&self) -> bool {
        self.kind == StepKind::Selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_is_exactly_one_kind() {
        let push = PusherStep::new_push_or_pull(Direction::Left, 2);
        assert!(push.is_push_or_pull());
        assert!(!push.is_move());
        assert!(!push.is_jump());
        assert!(!push.is_pusher_selection());
        assert_eq!(push.moved_box_id(), Some(2));

        let jump = PusherStep::new_jump(Direction::Up);
        assert!(jump.is_jump());
        assert!(!jump.is_push_or_pull());
        assert_eq!(jump.moved_box_id(), None);
    }

    #[test]
    fn pusher_attribution() {
        let step = PusherStep::new_move(Direction::Right).with_pusher_id(3);
        assert_eq!(step.pusher_id(), 3);
        assert_eq!(step.direction(), Direction::Right);
    }
}
