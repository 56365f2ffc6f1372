#[cfg(test)]
pub mod test {
    use anyhow::Result;
    use std::collections::HashSet;

    use crate::agent::MinimaxAgent;
    use crate::board::{Board, Player};
    use crate::search::Minimax;
    use crate::{COLUMNS, MAX_EVALUATION, MIN_EVALUATION, ROWS};

    // fills the board without either player ever making a winning run:
    //   X X O O
    //   O O X X
    //   X X O O
    //   O O X X
    const DRAW_SEQUENCE: [usize; 16] = [0, 2, 1, 3, 6, 4, 7, 5, 8, 10, 9, 11, 14, 12, 15, 13];

    #[test]
    pub fn available_and_played_partition_the_board() {
        let mut board = Board::new();
        for &index in DRAW_SEQUENCE.iter() {
            assert!(board.apply_move(index));

            let available = board.available_moves();
            let played = board.played_moves();
            assert_eq!(available.len() + played.len(), ROWS * COLUMNS);
            assert!(available.intersection(played).next().is_none());
            for cell in 0..ROWS * COLUMNS {
                assert!(available.contains(&cell) || played.contains(&cell));
                assert_eq!(board.is_blank(cell), available.contains(&cell));
            }
        }
    }

    #[test]
    pub fn clone_is_deeply_independent() -> Result<()> {
        let board = Board::from_moves(&[0, 5])?;
        let mut copy = board.clone();

        assert!(copy.apply_move(1));

        assert_eq!(board.move_count(), 2);
        assert!(board.is_blank(1));
        assert_eq!(copy.move_count(), 3);
        assert_ne!(board, copy);
        Ok(())
    }

    #[test]
    pub fn transpositions_compare_equal_and_share_a_hash() -> Result<()> {
        let first = Board::from_moves(&[0, 5, 2])?;
        let second = Board::from_moves(&[2, 5, 0])?;

        assert_eq!(first, second);
        assert_eq!(first.position_hash(), second.position_hash());

        // usable as a map key across move orders
        let mut memo = HashSet::new();
        memo.insert(first);
        assert!(memo.contains(&second));
        Ok(())
    }

    #[test]
    pub fn position_hash_encodes_marks_in_base_three() -> Result<()> {
        let board = Board::from_moves(&[0, 5])?;
        // X contributes 1 * 3^0, O contributes 2 * 3^5
        assert_eq!(board.position_hash(), 1 + 2 * 3u64.pow(5));
        Ok(())
    }

    #[test]
    pub fn occupied_cell_move_is_rejected_without_mutation() -> Result<()> {
        let mut board = Board::from_moves(&[0])?;
        let before = board.clone();

        assert!(!board.apply_move(0));

        assert_eq!(board, before);
        assert_eq!(board.move_count(), 1);
        assert_eq!(board.turn(), Player::B);
        assert_eq!(board.position_hash(), before.position_hash());
        Ok(())
    }

    #[test]
    #[should_panic(expected = "game over")]
    pub fn moving_on_a_finished_game_panics() {
        let mut board = Board::from_moves(&[0, 4, 1, 5, 2, 6, 3]).unwrap();
        board.apply_move(7);
    }

    #[test]
    pub fn four_in_a_row_ends_the_game() -> Result<()> {
        // X takes row 0 with the final move
        let mut board = Board::from_moves(&[0, 4, 1, 5, 2, 6])?;
        assert!(!board.is_game_over());

        assert!(board.apply_move(3));
        assert!(board.is_game_over());
        assert_eq!(board.winner(), Some(Player::A));
        Ok(())
    }

    #[test]
    pub fn wins_are_detected_on_every_line_direction() -> Result<()> {
        // column 0
        let vertical = Board::from_moves(&[0, 1, 4, 2, 8, 3, 12])?;
        assert_eq!(vertical.winner(), Some(Player::A));

        // main diagonal
        let diagonal = Board::from_moves(&[0, 1, 5, 2, 10, 4, 15])?;
        assert_eq!(diagonal.winner(), Some(Player::A));

        // anti-diagonal
        let anti_diagonal = Board::from_moves(&[3, 0, 6, 1, 9, 2, 12])?;
        assert_eq!(anti_diagonal.winner(), Some(Player::A));

        // row 1 taken by O
        let row = Board::from_moves(&[0, 4, 1, 5, 2, 6, 12, 7])?;
        assert_eq!(row.winner(), Some(Player::B));
        Ok(())
    }

    #[test]
    pub fn terminal_states_evaluate_to_sentinels() -> Result<()> {
        let won = Board::from_moves(&[0, 4, 1, 5, 2, 6, 3])?;
        assert!(won.is_game_over());
        assert_eq!(won.evaluation(), MAX_EVALUATION);

        let lost = Board::from_moves(&[0, 4, 1, 5, 2, 6, 12, 7])?;
        assert!(lost.is_game_over());
        assert_eq!(lost.evaluation(), MIN_EVALUATION);

        let draw = Board::from_moves(&DRAW_SEQUENCE)?;
        assert!(draw.is_game_over());
        assert_eq!(draw.winner(), None);
        assert_eq!(draw.evaluation(), 0);
        Ok(())
    }

    #[test]
    pub fn heuristic_never_returns_sentinels() -> Result<()> {
        assert_eq!(Board::new().evaluation(), 0);

        let cases: [&[usize]; 4] = [&[0], &[0, 5], &[0, 5, 1], &[0, 4, 1, 5, 2, 6]];
        for &moves in cases.iter() {
            let board = Board::from_moves(moves)?;
            assert!(!board.is_game_over());
            assert_ne!(board.evaluation(), MAX_EVALUATION);
            assert_ne!(board.evaluation(), MIN_EVALUATION);
        }
        Ok(())
    }

    #[test]
    pub fn open_runs_score_for_their_owner() -> Result<()> {
        // X holds an open three on row 0 with X to move
        let board = Board::from_moves(&[0, 5, 1, 6, 2, 9])?;
        assert!(board.evaluation() > 0);
        Ok(())
    }

    #[test]
    pub fn opening_children_collapse_to_symmetry_classes() {
        let board = Board::new();
        // the 16 opening moves fall into 3 classes under the symmetries of
        // the square: corner, edge and inner cells
        assert_eq!(board.children().len(), 3);
        assert_eq!(board.children_with_actions().len(), 16);
    }

    #[test]
    pub fn symmetry_pruning_stops_once_the_opening_is_over() -> Result<()> {
        let board = Board::from_moves(&[0, 4, 1, 5])?;
        assert_eq!(board.children().len(), board.available_moves().len());
        Ok(())
    }

    #[test]
    pub fn finished_games_have_no_children() -> Result<()> {
        let board = Board::from_moves(&[0, 4, 1, 5, 2, 6, 3])?;
        assert!(board.children().is_empty());
        assert!(board.children_with_actions().is_empty());
        Ok(())
    }

    #[test]
    pub fn depth_one_search_takes_an_immediate_win() -> Result<()> {
        // X to move with three in a row and the fourth cell open
        let board = Board::from_moves(&[0, 4, 1, 5, 2, 6])?;
        assert_eq!(MinimaxAgent::select_move(&board, 1)?, 3);

        // same for O as the minimizing player
        let board = Board::from_moves(&[0, 4, 1, 5, 2, 6, 12])?;
        assert_eq!(MinimaxAgent::select_move(&board, 1)?, 7);
        Ok(())
    }

    #[test]
    pub fn iterative_deepening_accepts_a_guaranteed_win() -> Result<()> {
        let board = Board::from_moves(&[0, 4, 1, 5, 2, 6])?;
        assert_eq!(
            MinimaxAgent::select_move_iterative(&board, (ROWS * COLUMNS) as u32)?,
            3
        );
        Ok(())
    }

    #[test]
    pub fn iterative_deepening_keeps_shallower_move_on_guaranteed_loss() -> Result<()> {
        // X threatens both cell 3 (row 0) and cell 12 (column 0); O to move
        // cannot block both, so depth 2 proves a forced loss for O
        let board = Board::from_moves(&[0, 5, 1, 6, 2, 9, 4, 10, 8])?;

        let mut engine = Minimax::new();
        let depth_one = engine.search(&board, 1)?;
        let expected = board
            .children_with_actions()
            .get(&depth_one)
            .copied()
            .unwrap();

        let chosen = MinimaxAgent::select_move_iterative(&board, (ROWS * COLUMNS) as u32)?;
        assert_eq!(chosen, expected);
        Ok(())
    }

    #[test]
    pub fn search_rejects_invalid_depth() {
        let board = Board::new();
        assert!(Minimax::new().search(&board, 0).is_err());
        assert!(Minimax::new().iterative_deepening(&board, 0).is_err());
    }
}
