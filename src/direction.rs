//! Directions of pusher and box movement.

use strum::VariantArray;

/// A direction of movement on the board.
///
/// All eight compass-like directions exist as variants; each
/// [`Tessellation`](crate::Tessellation) accepts only a subset of them.
#[derive(Copy, Clone, Debug, VariantArray, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Direction {
    Up,
    NorthEast,
    Right,
    SouthEast,
    Down,
    SouthWest,
    Left,
    NorthWest,
}

impl Direction {
    /// The statically known opposite of this direction.
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::NorthEast => Self::SouthWest,
            Self::Right => Self::Left,
            Self::SouthEast => Self::NorthWest,
            Self::Down => Self::Up,
            Self::SouthWest => Self::NorthEast,
            Self::Left => Self::Right,
            Self::NorthWest => Self::SouthEast,
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::VariantArray;

    use super::Direction;

    #[test]
    fn opposite_is_involution() {
        for direction in Direction::VARIANTS {
            assert_eq!(direction.opposite().opposite(), *direction);
            assert_ne!(direction.opposite(), *direction);
        }
    }
}
