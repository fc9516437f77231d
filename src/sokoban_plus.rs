//! Sokoban+ piece tagging.
//!
//! Under Sokoban+ rules each box and goal carries a numeric tag ("plus id");
//! the board is solved only when every goal holds a box with the same tag.
//! Tags come from two whitespace-separated integer strings, `boxorder` and
//! `goalorder`, assigning tags to pieces in ID order.

use std::cell::OnceCell;
use std::collections::BTreeMap;

use crate::manager::{PieceId, DEFAULT_PIECE_ID};

/// Sokoban+ tag attached to a box or goal.
pub type PlusId = usize;

/// Plus id of untagged pieces, and of every piece while Sokoban+ is
/// disabled.
pub const DEFAULT_PLUS_ID: PlusId = 0;

// Original Sokoban+ used 99 for untagged pieces. Legacy puzzles carrying it
// are normalized transparently, as long as the piece count stays below the
// legacy value.
const LEGACY_DEFAULT_PLUS_ID: PlusId = 99;

/// Invalid Sokoban+ data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SokobanPlusDataError {
    /// Something other than digits and whitespace in an order string.
    #[display("can't parse Sokoban+ data; only digits and spaces allowed")]
    IllegalCharacters,
    /// An order string defines more IDs than there are pieces.
    #[display("Sokoban+ data defines {found} IDs for {expected} pieces")]
    WrongLength {
        /// Number of IDs found in the order string.
        found: usize,
        /// Number of pieces on the board.
        expected: usize,
    },
    /// Box and goal tags don't pair up.
    #[display("Sokoban+ data doesn't define matching ID sets for boxes and goals")]
    UnbalancedIds,
}

#[derive(Debug, Clone)]
struct ParsedOrders {
    box_plus_ids: BTreeMap<PieceId, PlusId>,
    goal_plus_ids: BTreeMap<PieceId, PlusId>,
}

/// Sokoban+ state for one board: the two order strings, their parsed tag
/// assignment and the enabled flag.
///
/// Orders are validated lazily; enabling fails on invalid data. While
/// disabled, every piece reports [`DEFAULT_PLUS_ID`].
#[derive(Debug)]
pub struct SokobanPlus {
    pieces_count: usize,
    boxorder: String,
    goalorder: String,
    enabled: bool,
    parsed: OnceCell<Result<ParsedOrders, SokobanPlusDataError>>,
}

impl SokobanPlus {
    /// Sokoban+ data for a board with `pieces_count` boxes and goals.
    pub fn new(pieces_count: usize, boxorder: &str, goalorder: &str) -> Self {
        Self {
            pieces_count,
            boxorder: boxorder.to_string(),
            goalorder: goalorder.to_string(),
            enabled: false,
            parsed: OnceCell::new(),
        }
    }

    /// True if `line` looks like Sokoban+ order data: digits and spaces,
    /// not blank.
    pub fn is_sokoban_plus_string(line: &str) -> bool {
        !line.trim().is_empty() && line.chars().all(|ch| ch.is_ascii_digit() || ch.is_whitespace())
    }

    /// Number of boxes (and goals) the orders apply to.
    pub fn pieces_count(&self) -> usize {
        self.pieces_count
    }

    /// Current boxorder string.
    pub fn boxorder(&self) -> &str {
        &self.boxorder
    }

    /// Current goalorder string.
    pub fn goalorder(&self) -> &str {
        &self.goalorder
    }

    /// Replaces the boxorder; disables Sokoban+ and re-validates lazily.
    pub fn set_boxorder(&mut self, boxorder: &str) {
        if boxorder != self.boxorder {
            self.boxorder = boxorder.to_string();
            self.enabled = false;
            self.parsed = OnceCell::new();
        }
    }

    /// Replaces the goalorder; disables Sokoban+ and re-validates lazily.
    pub fn set_goalorder(&mut self, goalorder: &str) {
        if goalorder != self.goalorder {
            self.goalorder = goalorder.to_string();
            self.enabled = false;
            self.parsed = OnceCell::new();
        }
    }

    /// True when the current orders parse and pair up.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// True when Sokoban+ rules are in force.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turns Sokoban+ rules on; fails when the order data is invalid.
    pub fn enable(&mut self) -> Result<(), SokobanPlusDataError> {
        self.validate().map(|_| ())?;
        self.enabled = true;
        Ok(())
    }

    /// Turns Sokoban+ rules off.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Plus id of the box with ID `box_id`.
    ///
    /// [`DEFAULT_PLUS_ID`] for every box while disabled; `None` for an
    /// unknown box ID while enabled.
    pub fn box_plus_id(&self, box_id: PieceId) -> Option<PlusId> {
        if !self.enabled {
            return Some(DEFAULT_PLUS_ID);
        }
        self.validate()
            .ok()
            .and_then(|parsed| parsed.box_plus_ids.get(&box_id).copied())
    }

    /// Plus id of the goal with ID `goal_id`.
    ///
    /// [`DEFAULT_PLUS_ID`] for every goal while disabled; `None` for an
    /// unknown goal ID while enabled.
    pub fn goal_plus_id(&self, goal_id: PieceId) -> Option<PlusId> {
        if !self.enabled {
            return Some(DEFAULT_PLUS_ID);
        }
        self.validate()
            .ok()
            .and_then(|parsed| parsed.goal_plus_ids.get(&goal_id).copied())
    }

    fn validate(&self) -> Result<&ParsedOrders, SokobanPlusDataError> {
        self.parsed
            .get_or_init(|| {
                let box_plus_ids = parse_order(&self.boxorder, self.pieces_count)?;
                let goal_plus_ids = parse_order(&self.goalorder, self.pieces_count)?;

                let mut box_tags: Vec<PlusId> = box_plus_ids
                    .values()
                    .copied()
                    .filter(|id| *id != DEFAULT_PLUS_ID)
                    .collect();
                let mut goal_tags: Vec<PlusId> = goal_plus_ids
                    .values()
                    .copied()
                    .filter(|id| *id != DEFAULT_PLUS_ID)
                    .collect();
                box_tags.sort_unstable();
                goal_tags.sort_unstable();
                if box_tags != goal_tags {
                    return Err(SokobanPlusDataError::UnbalancedIds);
                }

                Ok(ParsedOrders {
                    box_plus_ids,
                    goal_plus_ids,
                })
            })
            .as_ref()
            .map_err(|error| *error)
    }
}

/// Parses one order string into a piece-ID → plus-id map of exactly
/// `pieces_count` entries, normalizing the legacy default tag and
/// right-padding with [`DEFAULT_PLUS_ID`].
fn parse_order(
    order: &str,
    pieces_count: usize,
) -> Result<BTreeMap<PieceId, PlusId>, SokobanPlusDataError> {
    let mut ids = Vec::new();
    for token in order.split_whitespace() {
        let id: PlusId = token
            .parse()
            .map_err(|_| SokobanPlusDataError::IllegalCharacters)?;
        let id = if id == LEGACY_DEFAULT_PLUS_ID && pieces_count < LEGACY_DEFAULT_PLUS_ID {
            DEFAULT_PLUS_ID
        } else {
            id
        };
        ids.push(id);
    }

    while ids.last() == Some(&DEFAULT_PLUS_ID) {
        ids.pop();
    }

    if ids.len() > pieces_count {
        return Err(SokobanPlusDataError::WrongLength {
            found: ids.len(),
            expected: pieces_count,
        });
    }
    ids.resize(pieces_count, DEFAULT_PLUS_ID);

    Ok(ids
        .into_iter()
        .enumerate()
        .map(|(index, plus_id)| (DEFAULT_PIECE_ID + index, plus_id))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_reports_default_for_everything() {
        let plus = SokobanPlus::new(3, "1 2 3", "3 2 1");
        assert_eq!(plus.box_plus_id(1), Some(DEFAULT_PLUS_ID));
        assert_eq!(plus.box_plus_id(42), Some(DEFAULT_PLUS_ID));
    }

    #[test]
    fn enabled_assigns_in_id_order() {
        let mut plus = SokobanPlus::new(3, "13 24 3", "3 13 24");
        plus.enable().unwrap();
        assert_eq!(plus.box_plus_id(1), Some(13));
        assert_eq!(plus.box_plus_id(2), Some(24));
        assert_eq!(plus.box_plus_id(3), Some(3));
        assert_eq!(plus.goal_plus_id(1), Some(3));
        assert_eq!(plus.box_plus_id(4), None);
    }

    #[test]
    fn short_orders_are_padded_with_default() {
        let mut plus = SokobanPlus::new(3, "2", "2");
        plus.enable().unwrap();
        assert_eq!(plus.box_plus_id(2), Some(DEFAULT_PLUS_ID));
        assert_eq!(plus.box_plus_id(3), Some(DEFAULT_PLUS_ID));
    }

    #[test]
    fn legacy_default_is_normalized() {
        let mut plus = SokobanPlus::new(2, "1 99", "99 1");
        plus.enable().unwrap();
        assert_eq!(plus.box_plus_id(2), Some(DEFAULT_PLUS_ID));
        assert_eq!(plus.goal_plus_id(1), Some(DEFAULT_PLUS_ID));
    }

    #[test]
    fn legacy_value_is_kept_on_large_boards() {
        let mut plus = SokobanPlus::new(100, "99", "99");
        plus.enable().unwrap();
        assert_eq!(plus.box_plus_id(1), Some(99));
    }

    #[test]
    fn unbalanced_ids_are_invalid() {
        let mut plus = SokobanPlus::new(2, "1 1", "1 2");
        assert!(!plus.is_valid());
        assert_eq!(plus.enable(), Err(SokobanPlusDataError::UnbalancedIds));
        assert!(!plus.is_enabled());
    }

    #[test]
    fn multiset_comparison_counts_duplicates() {
        // one box tagged 2 but two goals tagged 2
        let plus = SokobanPlus::new(3, "2 3", "2 2 3");
        assert!(!plus.is_valid());
    }

    #[test]
    fn garbage_is_rejected() {
        let mut plus = SokobanPlus::new(2, "1 x", "1 2");
        assert_eq!(plus.enable(), Err(SokobanPlusDataError::IllegalCharacters));
    }

    #[test]
    fn too_many_ids_are_rejected() {
        let plus = SokobanPlus::new(1, "1 2 3", "1");
        assert!(!plus.is_valid());
    }

    #[test]
    fn setting_order_disables() {
        let mut plus = SokobanPlus::new(2, "1 2", "2 1");
        plus.enable().unwrap();
        plus.set_boxorder("2 1");
        assert!(!plus.is_enabled());
        plus.enable().unwrap();
        assert_eq!(plus.box_plus_id(1), Some(2));
    }

    #[test]
    fn order_string_detection() {
        assert!(SokobanPlus::is_sokoban_plus_string("1 2 3"));
        assert!(!SokobanPlus::is_sokoban_plus_string("   "));
        assert!(!SokobanPlus::is_sokoban_plus_string("1 a 3"));
    }
}
