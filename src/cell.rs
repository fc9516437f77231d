//! A single cell of the board.

use crate::puzzle::{self, BoardConversionError};

/// Contents of one board cell: wall and piece flags plus two advisory flags
/// set by analysis passes.
///
/// There is no game logic in this type. Putting a pusher onto a wall cell
/// simply replaces the wall; whether that makes sense is the caller's
/// concern. A cell never reports more than one of wall/pusher/box as its
/// primary content, but a goal may coexist with any of them.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct BoardCell {
    wall: bool,
    pusher: bool,
    box_piece: bool,
    goal: bool,
    /// Set by [`BoardGraph::mark_play_area`](crate::BoardGraph::mark_play_area),
    /// never by movement logic.
    pub is_in_playable_area: bool,
    /// Reserved for external deadlock analysis passes; core algorithms never
    /// set or read it.
    pub is_deadlock: bool,
}

impl BoardCell {
    /// Builds a cell from one board character.
    ///
    /// Character precedence is wall > pusher(+goal) > box(+goal) > goal >
    /// floor. Unknown characters fail with [`BoardConversionError`].
    pub fn from_char(character: char) -> Result<Self, BoardConversionError> {
        let mut cell = Self::default();

        if puzzle::is_empty_floor(character) {
            return Ok(cell);
        }

        if puzzle::is_wall(character) {
            cell.set_wall(true);
        } else if puzzle::is_pusher(character) {
            cell.set_pusher(true);
            if puzzle::is_goal(character) {
                cell.set_goal(true);
            }
        } else if puzzle::is_box(character) {
            cell.set_box(true);
            if puzzle::is_goal(character) {
                cell.set_goal(true);
            }
        } else if puzzle::is_goal(character) {
            cell.set_goal(true);
        } else {
            return Err(BoardConversionError::IllegalCharacter { character });
        }

        Ok(cell)
    }

    /// Board character for this cell.
    pub fn to_char(&self, use_visible_floor: bool) -> char {
        if !self.has_piece() {
            if self.wall {
                puzzle::WALL
            } else if use_visible_floor {
                puzzle::VISIBLE_FLOOR
            } else {
                puzzle::FLOOR
            }
        } else if self.pusher {
            if self.goal {
                puzzle::PUSHER_ON_GOAL
            } else {
                puzzle::PUSHER
            }
        } else if self.box_piece {
            if self.goal {
                puzzle::BOX_ON_GOAL
            } else {
                puzzle::BOX
            }
        } else {
            puzzle::GOAL
        }
    }

    /// Clears the cell, turning it into empty floor.
    pub fn clear(&mut self) {
        self.wall = false;
        self.pusher = false;
        self.box_piece = false;
        self.goal = false;
    }

    /// True if there is a pusher, box or goal on this cell.
    pub fn has_piece(&self) -> bool {
        self.pusher || self.box_piece || self.goal
    }

    /// True if there is no piece and no wall on this cell.
    pub fn is_empty_floor(&self) -> bool {
        !(self.pusher || self.box_piece || self.goal || self.wall)
    }

    /// True if this is a wall or a box sitting on its goal.
    pub fn is_border_element(&self) -> bool {
        self.wall || (self.box_piece && self.goal)
    }

    /// True if a pusher or box may be placed here: no wall and no occupant.
    ///
    /// The `put_*` modifiers do not consult this; it exists for movement
    /// logic that must refuse to stack pieces.
    pub fn can_put_pusher_or_box(&self) -> bool {
        !(self.box_piece || self.pusher || self.wall)
    }

    /// True if this cell is a wall.
    pub fn is_wall(&self) -> bool {
        self.wall
    }

    /// Sets or clears the wall flag. Setting it removes any pieces.
    pub fn set_wall(&mut self, value: bool) {
        if value {
            self.wall = true;
            self.pusher = false;
            self.box_piece = false;
            self.goal = false;
        } else {
            self.wall = false;
        }
    }

    /// True if a pusher stands on this cell.
    pub fn has_pusher(&self) -> bool {
        self.pusher
    }

    /// Sets or clears the pusher flag. Setting it removes a wall or box.
    pub fn set_pusher(&mut self, value: bool) {
        if value {
            self.pusher = true;
            self.box_piece = false;
            self.wall = false;
        } else {
            self.pusher = false;
        }
    }

    /// Puts a pusher onto this cell.
    pub fn put_pusher(&mut self) {
        self.set_pusher(true);
    }

    /// Removes the pusher from this cell.
    pub fn remove_pusher(&mut self) {
        self.set_pusher(false);
    }

    /// True if a box sits on this cell.
    pub fn has_box(&self) -> bool {
        self.box_piece
    }

    /// Sets or clears the box flag. Setting it removes a wall or pusher.
    pub fn set_box(&mut self, value: bool) {
        if value {
            self.box_piece = true;
            self.pusher = false;
            self.wall = false;
        } else {
            self.box_piece = false;
        }
    }

    /// Puts a box onto this cell.
    pub fn put_box(&mut self) {
        self.set_box(true);
    }

    /// Removes the box from this cell.
    pub fn remove_box(&mut self) {
        self.set_box(false);
    }

    /// True if this cell is a goal.
    pub fn has_goal(&self) -> bool {
        self.goal
    }

    /// Sets or clears the goal flag. Setting it removes a wall.
    pub fn set_goal(&mut self, value: bool) {
        if value {
            self.goal = true;
            self.wall = false;
        } else {
            self.goal = false;
        }
    }

    /// Marks this cell as a goal.
    pub fn put_goal(&mut self) {
        self.set_goal(true);
    }

    /// Removes the goal from this cell.
    pub fn remove_goal(&mut self) {
        self.set_goal(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_precedence() {
        assert!(BoardCell::from_char('#').unwrap().is_wall());

        let pusher_on_goal = BoardCell::from_char('+').unwrap();
        assert!(pusher_on_goal.has_pusher() && pusher_on_goal.has_goal());

        let box_on_goal = BoardCell::from_char('*').unwrap();
        assert!(box_on_goal.has_box() && box_on_goal.has_goal());

        assert!(BoardCell::from_char('.').unwrap().has_goal());
        assert!(BoardCell::from_char(' ').unwrap().is_empty_floor());
        assert!(BoardCell::from_char('-').unwrap().is_empty_floor());
    }

    #[test]
    fn alternate_characters() {
        for ch in ['p', 'm'] {
            assert!(BoardCell::from_char(ch).unwrap().has_pusher());
        }
        for ch in ['P', 'M'] {
            let cell = BoardCell::from_char(ch).unwrap();
            assert!(cell.has_pusher() && cell.has_goal());
        }
        assert!(BoardCell::from_char('b').unwrap().has_box());
        let cell = BoardCell::from_char('B').unwrap();
        assert!(cell.has_box() && cell.has_goal());
        assert!(BoardCell::from_char('o').unwrap().has_goal());
    }

    #[test]
    fn illegal_character_is_rejected() {
        assert!(matches!(
            BoardCell::from_char('!'),
            Err(BoardConversionError::IllegalCharacter { character: '!' })
        ));
    }

    #[test]
    fn wall_excludes_pieces() {
        let mut cell = BoardCell::from_char('*').unwrap();
        cell.set_wall(true);
        assert!(cell.is_wall());
        assert!(!cell.has_box());
        assert!(!cell.has_goal());

        cell.put_pusher();
        assert!(!cell.is_wall());
        assert!(cell.has_pusher());
    }

    #[test]
    fn char_roundtrip() {
        for ch in ['#', '@', '+', '$', '*', '.', ' '] {
            assert_eq!(BoardCell::from_char(ch).unwrap().to_char(false), ch);
        }
        let floor = BoardCell::default();
        assert_eq!(floor.to_char(true), '-');
    }

    #[test]
    fn occupancy_queries() {
        let mut cell = BoardCell::default();
        assert!(cell.can_put_pusher_or_box());
        cell.put_goal();
        assert!(cell.can_put_pusher_or_box());
        cell.put_box();
        assert!(!cell.can_put_pusher_or_box());
        assert!(cell.is_border_element());
    }
}
