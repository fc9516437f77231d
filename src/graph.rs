//! The board as a directed graph of cells.

use std::collections::{HashSet, VecDeque};
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use petgraph::algo::astar;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::cell::BoardCell;
use crate::direction::Direction;
use crate::puzzle::{BoardConversionError, Puzzle};
use crate::tessellation::Tessellation;

// Cost of stepping onto an obstacle in weighted path search. Must exceed the
// number of directions so a single obstacle outweighs any detour.
const MAX_EDGE_WEIGHT: usize = 100;

/// A board position outside the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("board position {position} is out of range")]
pub struct OffBoardError {
    /// The rejected position.
    pub position: usize,
}

/// One node per board position, edges labeled by movement [`Direction`].
///
/// The graph is built once from a [`Puzzle`] and owns all cell data from then
/// on. Triangular boards connect some cell pairs through two differently
/// labeled edges; every other tessellation produces at most one edge per
/// (source, direction) pair.
#[derive(Debug)]
pub struct BoardGraph {
    graph: DiGraph<BoardCell, Direction>,
    tessellation: Tessellation,
    width: usize,
    height: usize,
}

impl BoardGraph {
    /// Builds the graph for `puzzle`, converting every character to a
    /// [`BoardCell`] and configuring edges from the puzzle's tessellation.
    pub fn new(puzzle: &Puzzle) -> Result<Self, BoardConversionError> {
        puzzle.check_dimensions()?;

        let mut graph = DiGraph::with_capacity(puzzle.size(), 4 * puzzle.size());
        for position in 0..puzzle.size() {
            let character = puzzle.get(position).unwrap_or(crate::puzzle::FLOOR);
            graph.add_node(BoardCell::from_char(character)?);
        }

        let mut board = Self {
            graph,
            tessellation: puzzle.tessellation(),
            width: puzzle.width(),
            height: puzzle.height(),
        };
        board.reconfigure_edges();

        Ok(board)
    }

    /// Tessellation this board uses.
    pub fn tessellation(&self) -> Tessellation {
        self.tessellation
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of positions on the board.
    pub fn size(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of directed edges on the board.
    pub fn edges_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Cell at `position`.
    pub fn cell(&self, position: usize) -> Result<&BoardCell, OffBoardError> {
        self.graph
            .node_weight(NodeIndex::new(position))
            .ok_or(OffBoardError { position })
    }

    /// Mutable cell at `position`.
    ///
    /// Editing cells while a manager or mover is attached to this board
    /// desynchronizes their piece tables; treat the board as manager-owned
    /// once wrapped.
    pub fn cell_mut(&mut self, position: usize) -> Result<&mut BoardCell, OffBoardError> {
        self.graph
            .node_weight_mut(NodeIndex::new(position))
            .ok_or(OffBoardError { position })
    }

    /// True if `position` is on the board.
    pub fn contains(&self, position: usize) -> bool {
        position < self.size()
    }

    /// Drops all edges and rebuilds them from the tessellation's neighbor
    /// rule. Idempotent.
    pub fn reconfigure_edges(&mut self) {
        self.graph.clear_edges();

        for src in 0..self.size() {
            for direction in self.tessellation.legal_directions() {
                let neighbor = self
                    .tessellation
                    .neighbor_position(src, *direction, self.width, self.height)
                    .expect("legal directions of own tessellation never fail");
                if let Some(neighbor) = neighbor {
                    self.graph
                        .add_edge(NodeIndex::new(src), NodeIndex::new(neighbor), *direction);
                }
            }
        }
    }

    /// Neighbor of `src` in `direction`, or `None` when no edge leads there.
    pub fn neighbor(
        &self,
        src: usize,
        direction: Direction,
    ) -> Result<Option<usize>, OffBoardError> {
        self.check_position(src)?;
        Ok(self
            .graph
            .edges(NodeIndex::new(src))
            .find(|edge| *edge.weight() == direction)
            .map(|edge| edge.target().index()))
    }

    /// All wall cells adjacent to `src`.
    pub fn wall_neighbors(&self, src: usize) -> Result<Vec<usize>, OffBoardError> {
        Ok(self
            .all_neighbors(src)?
            .into_iter()
            .filter(|neighbor| self.cell_at(*neighbor).is_wall())
            .collect())
    }

    /// All cells adjacent to `src`, each reported once.
    pub fn all_neighbors(&self, src: usize) -> Result<Vec<usize>, OffBoardError> {
        self.check_position(src)?;
        Ok(self
            .graph
            .neighbors(NodeIndex::new(src))
            .map(|node| node.index())
            .unique()
            .collect())
    }

    /// Number of directed edges from `src` to `dst`; zero when either
    /// position is off board.
    pub fn out_edges_count(&self, src: usize, dst: usize) -> usize {
        if !self.contains(src) || !self.contains(dst) {
            return 0;
        }
        self.graph
            .edges(NodeIndex::new(src))
            .filter(|edge| edge.target().index() == dst)
            .count()
    }

    /// All positions reachable from `root` without entering an obstacle.
    ///
    /// `excluded` positions are traversed through but never reported,
    /// distinguishing "can stand here" from "can pass through here". The
    /// root itself is reported unless excluded.
    pub fn reachables(
        &self,
        root: usize,
        excluded: &[usize],
        is_obstacle: impl Fn(usize) -> bool,
    ) -> Result<Vec<usize>, OffBoardError> {
        self.check_position(root)?;

        let excluded: HashSet<usize> = excluded.iter().copied().collect();
        let mut visited = vec![false; self.size()];
        visited[root] = true;
        let mut to_inspect = VecDeque::from([root]);
        let mut reachable = Vec::new();

        while let Some(current) = to_inspect.pop_front() {
            if !excluded.contains(&current) {
                reachable.push(current);
            }

            for neighbor in self.all_neighbors(current)? {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    if !is_obstacle(neighbor) {
                        to_inspect.push_back(neighbor);
                    }
                }
            }
        }

        Ok(reachable)
    }

    /// All positions a pusher standing on `pusher_position` could walk to.
    ///
    /// Doesn't require that `pusher_position` actually holds a pusher.
    pub fn positions_reachable_by_pusher(
        &self,
        pusher_position: usize,
        excluded: &[usize],
    ) -> Result<Vec<usize>, OffBoardError> {
        self.reachables(pusher_position, excluded, |position| {
            !self.cell_at(position).can_put_pusher_or_box()
        })
    }

    /// Top-left position reachable by a pusher from `pusher_position`
    /// without pushing boxes; `pusher_position` itself when nothing is
    /// reachable.
    pub fn normalized_pusher_position(
        &self,
        pusher_position: usize,
        excluded: &[usize],
    ) -> Result<usize, OffBoardError> {
        Ok(self
            .positions_reachable_by_pusher(pusher_position, excluded)?
            .into_iter()
            .min()
            .unwrap_or(pusher_position))
    }

    /// Flags every cell reachable by any pusher or box as playable.
    ///
    /// Only walls block this flood fill; boxes and pushers are passed
    /// through.
    pub fn mark_play_area(&mut self) {
        let mut piece_positions = Vec::new();
        for position in 0..self.size() {
            let cell = self.cell_at(position);
            if cell.has_box() || cell.has_pusher() {
                piece_positions.push(position);
            }
        }

        let mut playable = vec![false; self.size()];
        for piece_position in &piece_positions {
            playable[*piece_position] = true;
            let reachable = self
                .reachables(*piece_position, &[], |position| self.cell_at(position).is_wall())
                .expect("piece positions are always on board");
            for position in reachable {
                playable[position] = true;
            }
        }

        for position in 0..self.size() {
            self.graph[NodeIndex::new(position)].is_in_playable_area = playable[position];
        }
    }

    /// Shortest path between two positions ignoring board content.
    ///
    /// Empty when `dst` is unreachable.
    pub fn shortest_path(&self, src: usize, dst: usize) -> Result<Vec<usize>, OffBoardError> {
        self.check_position(src)?;
        self.check_position(dst)?;

        let found = astar(
            &self.graph,
            NodeIndex::new(src),
            |node| node == NodeIndex::new(dst),
            |_| 1usize,
            |_| 0,
        );

        Ok(found
            .map(|(_, path)| path.into_iter().map(|node| node.index()).collect())
            .unwrap_or_default())
    }

    /// Cheapest path between two positions where stepping onto a wall, box
    /// or pusher costs a large constant and free cells cost 1.
    ///
    /// The cheapest path may still cross an obstacle when no other route
    /// exists; [`find_move_path`](Self::find_move_path) layers the validity
    /// filter on top.
    pub fn dijkstra_path(&self, src: usize, dst: usize) -> Result<Vec<usize>, OffBoardError> {
        self.check_position(src)?;
        self.check_position(dst)?;

        let found = astar(
            &self.graph,
            NodeIndex::new(src),
            |node| node == NodeIndex::new(dst),
            |edge| self.out_edge_weight(edge.target().index()),
            |_| 0,
        );

        Ok(found
            .map(|(_, path)| path.into_iter().map(|node| node.index()).collect())
            .unwrap_or_default())
    }

    /// Positions a pusher passes through when jumping from `src` to `dst`.
    pub fn find_jump_path(&self, src: usize, dst: usize) -> Result<Vec<usize>, OffBoardError> {
        self.shortest_path(src, dst)
    }

    /// Positions a pusher passes through when walking from `src` to `dst`
    /// without pushing anything.
    ///
    /// Empty when every route crosses an obstacle; an empty path means
    /// unreachable, never an error.
    pub fn find_move_path(&self, src: usize, dst: usize) -> Result<Vec<usize>, OffBoardError> {
        let path = self.dijkstra_path(src, dst)?;

        let blocked = path
            .iter()
            .skip(1)
            .any(|position| !self.cell_at(*position).can_put_pusher_or_box());
        if blocked {
            return Ok(Vec::new());
        }

        Ok(path)
    }

    /// Converts a path of positions to the directions connecting them.
    ///
    /// Consecutive positions with no connecting edge contribute nothing.
    pub fn positions_path_to_directions_path(
        &self,
        positions: &[usize],
    ) -> Result<Vec<Direction>, OffBoardError> {
        for position in positions {
            self.check_position(*position)?;
        }

        let mut directions = Vec::new();

        for (src, dst) in positions.iter().tuple_windows() {
            let edge = self
                .graph
                .edges(NodeIndex::new(*src))
                .find(|edge| edge.target().index() == *dst);
            if let Some(edge) = edge {
                directions.push(*edge.weight());
            }
        }

        Ok(directions)
    }

    /// Position reached by walking `directions` from `src`, stopping early
    /// at the first step that would leave the board.
    pub fn path_destination(
        &self,
        src: usize,
        directions: &[Direction],
    ) -> Result<usize, OffBoardError> {
        self.check_position(src)?;

        let mut current = src;
        for direction in directions {
            match self.neighbor(current, *direction)? {
                Some(next) => current = next,
                None => break,
            }
        }

        Ok(current)
    }

    /// Renders the board through the puzzle character vocabulary.
    pub fn to_board_str(&self, use_visible_floor: bool) -> String {
        let mut puzzle = Puzzle::new(self.tessellation, self.width, self.height);
        for position in 0..self.size() {
            puzzle.set(position, self.cell_at(position).to_char(false));
        }
        puzzle.to_board_str(use_visible_floor)
    }

    // Position-checked accessors above funnel into these; callers inside the
    // crate hold positions already known to be on board.
    pub(crate) fn cell_at(&self, position: usize) -> &BoardCell {
        &self.graph[NodeIndex::new(position)]
    }

    pub(crate) fn cell_at_mut(&mut self, position: usize) -> &mut BoardCell {
        &mut self.graph[NodeIndex::new(position)]
    }

    fn check_position(&self, position: usize) -> Result<(), OffBoardError> {
        if self.contains(position) {
            Ok(())
        } else {
            Err(OffBoardError { position })
        }
    }

    fn out_edge_weight(&self, target: usize) -> usize {
        let cell = self.cell_at(target);
        if cell.is_wall() || cell.has_box() || cell.has_pusher() {
            MAX_EDGE_WEIGHT
        } else {
            1
        }
    }
}

impl Display for BoardGraph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_board_str(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: &[&str]) -> BoardGraph {
        BoardGraph::new(&Puzzle::from_rows(Tessellation::Sokoban, rows)).unwrap()
    }

    #[test]
    fn empty_2x2_square_board_has_8_edges() {
        let board = board(&["  ", "  "]);
        assert_eq!(board.edges_count(), 8);
        for position in 0..4 {
            assert_eq!(board.all_neighbors(position).unwrap().len(), 2);
        }
    }

    #[test]
    fn trioban_pairs_connect_twice() {
        let puzzle = Puzzle::from_rows(Tessellation::Trioban, &["   ", "   ", "   "]);
        let board = BoardGraph::new(&puzzle).unwrap();
        // two distinct directions connect a triangle pair
        assert_eq!(board.out_edges_count(0, 1), 2);

        let square = BoardGraph::new(&Puzzle::from_rows(Tessellation::Sokoban, &["  ", "  "]))
            .unwrap();
        assert_eq!(square.out_edges_count(0, 1), 1);
    }

    #[test]
    fn reconfigure_edges_is_idempotent() {
        let mut board = board(&["   ", "   "]);
        let before = board.edges_count();
        board.reconfigure_edges();
        assert_eq!(board.edges_count(), before);
    }

    #[test]
    fn neighbor_lookup() {
        let board = board(&["# #", "   "]);
        assert_eq!(board.neighbor(0, Direction::Right).unwrap(), Some(1));
        assert_eq!(board.neighbor(0, Direction::Up).unwrap(), None);
        assert!(board.neighbor(17, Direction::Up).is_err());
    }

    #[test]
    fn wall_neighbors_reports_walls_only() {
        let board = board(&["# #", "   "]);
        assert_eq!(board.wall_neighbors(1).unwrap().len(), 2);
        assert_eq!(board.wall_neighbors(4).unwrap().len(), 0);
    }

    #[test]
    fn reachables_respects_obstacles_and_exclusions() {
        // walled-off right column
        let board = board(&[" # ", " # "]);
        let reachable = board
            .reachables(0, &[], |position| board.cell_at(position).is_wall())
            .unwrap();
        assert_eq!(reachable, vec![0, 3]);

        let without_root = board
            .reachables(0, &[0], |position| board.cell_at(position).is_wall())
            .unwrap();
        assert_eq!(without_root, vec![3]);
    }

    #[test]
    fn excluded_positions_are_passed_through() {
        let board = board(&["   "]);
        let reachable = board.positions_reachable_by_pusher(0, &[1]).unwrap();
        // 1 is excluded from the result but 2 stays reachable through it
        assert_eq!(reachable, vec![0, 2]);
    }

    #[test]
    fn move_path_avoids_obstacles() {
        let board = board(&["@$ ", "   "]);
        // direct route crosses the box; the detour goes below
        assert_eq!(board.find_move_path(0, 2).unwrap(), vec![0, 3, 4, 5, 2]);
        // jumps ignore the box
        assert_eq!(board.find_jump_path(0, 2).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn move_path_is_empty_when_everything_is_blocked() {
        let board = board(&["@#  "]);
        assert_eq!(board.find_move_path(0, 3).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn directions_path_roundtrip() {
        let board = board(&["   ", "   "]);
        let path = board.shortest_path(0, 5).unwrap();
        let directions = board.positions_path_to_directions_path(&path).unwrap();
        assert_eq!(directions.len(), path.len() - 1);
        assert_eq!(board.path_destination(0, &directions).unwrap(), 5);
    }

    #[test]
    fn path_destination_stops_at_board_edge() {
        let board = board(&["  "]);
        let destination = board
            .path_destination(0, &[Direction::Right, Direction::Right, Direction::Right])
            .unwrap();
        assert_eq!(destination, 1);
    }

    #[test]
    fn mark_play_area_floods_from_pieces() {
        let mut board = board(&["@ #.", "## #"]);
        board.mark_play_area();
        assert!(board.cell_at(0).is_in_playable_area);
        assert!(board.cell_at(1).is_in_playable_area);
        assert!(!board.cell_at(3).is_in_playable_area);
    }

    #[test]
    fn board_str_roundtrip() {
        let rows = ["#####", "#@$.#", "#####"];
        let board = board(&rows);
        assert_eq!(board.to_board_str(false), "#####\n#@$.#\n#####\n");
    }

    #[test]
    fn oversized_board_is_rejected() {
        let puzzle = Puzzle::new(Tessellation::Sokoban, crate::location::MAX_WIDTH + 1, 1);
        assert!(matches!(
            BoardGraph::new(&puzzle),
            Err(BoardConversionError::BoardTooLarge { .. })
        ));
    }
}
