#[cfg(test)]
mod tests {
    use crate::direction::Direction;
    use crate::graph::BoardGraph;
    use crate::hashed_manager::HashedBoardManager;
    use crate::mover::{IllegalMoveError, Mover, SolvingMode};
    use crate::puzzle::Puzzle;
    use crate::tessellation::Tessellation;

    fn board(tessellation: Tessellation, rows: &[&str]) -> BoardGraph {
        BoardGraph::new(&Puzzle::from_rows(tessellation, rows)).unwrap()
    }

    #[test]
    fn empty_square_board_has_two_edges_per_cell() {
        let board = board(Tessellation::Sokoban, &["  ", "  "]);
        // boundary neighbors fall off board and are omitted
        assert_eq!(board.edges_count(), 8);
    }

    #[test]
    fn forward_game_on_a_one_row_board() {
        let mut mover = Mover::new(board(Tessellation::Sokoban, &["#@$.#"])).unwrap();

        mover.move_pusher(Direction::Right).unwrap();
        assert_eq!(mover.board_manager().pusher_position(1).unwrap(), 2);
        assert_eq!(mover.board_manager().manager().box_position(1).unwrap(), 3);
        assert!(mover.board_manager().is_solved());

        // the box is on the goal in front of the wall; pushing further fails
        assert!(matches!(
            mover.move_pusher(Direction::Right),
            Err(IllegalMoveError::DestinationBlocked { .. })
        ));
    }

    #[test]
    fn reverse_session_solves_by_inverse_pulls() {
        let mut mover = Mover::with_mode(
            board(Tessellation::Sokoban, &["#####", "#@$.#", "#####"]),
            SolvingMode::Reverse,
        )
        .unwrap();

        // construction switched boxes and goals, so the board is not solved
        assert!(!mover.board_manager().is_solved());

        // pusher 6, goal 7, box 8: step onto the goal, pull the box onto it
        mover.move_pusher(Direction::Right).unwrap();
        mover.move_pusher(Direction::Left).unwrap();
        assert!(mover.board_manager().is_solved());
    }

    #[test]
    fn trioban_adjacent_triangles_share_two_edges() {
        let trioban = board(Tessellation::Trioban, &["   ", "   ", "   "]);
        assert_eq!(trioban.out_edges_count(0, 1), 2);

        let sokoban = board(Tessellation::Sokoban, &["   ", "   ", "   "]);
        assert_eq!(sokoban.out_edges_count(0, 1), 1);
    }

    #[test]
    fn hexoban_game_moves_diagonally() {
        // pusher on even row 0, box below on odd row 1; the south-east
        // diagonal keeps the column on even rows and shifts it right on odd
        // rows, so the box ends up one cell to the right on row 2
        let mut mover = Mover::new(board(Tessellation::Hexoban, &["@  ", "$  ", " . "])).unwrap();

        mover.move_pusher(Direction::SouthEast).unwrap();
        assert_eq!(mover.board_manager().pusher_position(1).unwrap(), 3);
        assert_eq!(mover.board_manager().manager().box_position(1).unwrap(), 7);
        assert!(mover.board_manager().is_solved());
    }

    #[test]
    fn octoban_diagonal_push_from_octagon_cell() {
        let mut mover = Mover::new(board(Tessellation::Octoban, &["@  ", " $ ", "  ."])).unwrap();

        mover.move_pusher(Direction::SouthEast).unwrap();
        assert_eq!(mover.board_manager().pusher_position(1).unwrap(), 4);
        assert_eq!(mover.board_manager().manager().box_position(1).unwrap(), 8);
        assert!(mover.board_manager().is_solved());
    }

    #[test]
    fn hash_round_trips_through_undo() {
        let mut mover = Mover::new(board(
            Tessellation::Sokoban,
            &["#####", "#@$ #", "# $.#", "#.  #", "#####"],
        ))
        .unwrap();

        for direction in [Direction::Right, Direction::Down] {
            let hash_before = mover.board_manager().state_hash();
            let state_before = mover.board_manager().state();

            mover.move_pusher(direction).unwrap();
            assert_ne!(mover.board_manager().state_hash(), hash_before);

            mover.undo_last_move().unwrap();
            assert_eq!(mover.board_manager().state_hash(), hash_before);

            let state_after = mover.board_manager().state();
            assert_eq!(state_after.pushers_positions, state_before.pushers_positions);
            assert_eq!(state_after.boxes_positions, state_before.boxes_positions);
        }
    }

    #[test]
    fn id_mapping_survives_a_round_trip() {
        let mut mover = Mover::new(board(
            Tessellation::Sokoban,
            &["######", "#@$ .#", "#@$ .#", "######"],
        ))
        .unwrap();

        let manager = mover.board_manager().manager();
        let pushers_before: Vec<_> = manager.pushers().collect();
        let boxes_before: Vec<_> = manager.boxes().collect();

        mover.move_pusher(Direction::Right).unwrap();
        mover.undo_last_move().unwrap();
        mover.select_pusher(2).unwrap();
        mover.move_pusher(Direction::Right).unwrap();
        mover.undo_last_move().unwrap();

        let manager = mover.board_manager().manager();
        let pushers_after: Vec<_> = manager.pushers().collect();
        let boxes_after: Vec<_> = manager.boxes().collect();
        assert_eq!(pushers_before, pushers_after);
        assert_eq!(boxes_before, boxes_after);
    }

    #[test]
    fn sokoban_plus_session_requires_matching_tags() {
        let rows = ["#@**#"];
        let puzzle = Puzzle::from_rows(Tessellation::Sokoban, &rows);

        // both boxes sit on goals, but their tags are crossed
        let mut crossed =
            HashedBoardManager::with_plus(BoardGraph::new(&puzzle).unwrap(), "1 2", "2 1");
        crossed.enable_sokoban_plus().unwrap();
        let mover = Mover::with_manager(crossed, SolvingMode::Forward).unwrap();
        assert!(!mover.board_manager().is_solved());
        assert!(!mover.board_manager().manager().is_solved());

        // matching tags on the same layout solve it
        let mut matching =
            HashedBoardManager::with_plus(BoardGraph::new(&puzzle).unwrap(), "1 2", "1 2");
        matching.enable_sokoban_plus().unwrap();
        let mover = Mover::with_manager(matching, SolvingMode::Forward).unwrap();
        assert!(mover.board_manager().is_solved());

        // and so does disabling Sokoban+ entirely
        let plain = Mover::new(board(Tessellation::Sokoban, &rows)).unwrap();
        assert!(plain.board_manager().is_solved());
    }

    #[test]
    fn last_move_renders_as_movement_characters() {
        let mut mover = Mover::new(board(Tessellation::Sokoban, &["#@$.#"])).unwrap();
        mover.move_pusher(Direction::Right).unwrap();

        let rendered: String = mover
            .last_move()
            .iter()
            .map(|step| Tessellation::Sokoban.pusher_step_to_char(step).unwrap())
            .collect();
        assert_eq!(rendered, "R");

        mover.undo_last_move().unwrap();
        let rendered: String = mover
            .last_move()
            .iter()
            .map(|step| Tessellation::Sokoban.pusher_step_to_char(step).unwrap())
            .collect();
        assert_eq!(rendered, "L");
    }

    #[test]
    fn board_renders_current_layout() {
        let mut mover = Mover::new(board(Tessellation::Sokoban, &["#@$.#"])).unwrap();
        mover.move_pusher(Direction::Right).unwrap();
        assert_eq!(mover.board().to_board_str(false), "# @*#\n");
    }
}
