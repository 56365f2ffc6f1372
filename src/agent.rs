//! A reactive agent that plays moves according to the minimax search

use anyhow::{anyhow, Result};

use crate::board::Board;
use crate::search::Minimax;
use crate::{COLUMNS, ROWS};

/// Selects moves for a position via the search engine
pub struct MinimaxAgent;

impl MinimaxAgent {
    /// Picks a move using a flat fixed-depth search
    pub fn select_move(board: &Board, depth: u32) -> Result<usize> {
        let best = Minimax::new().search(board, Self::capped(depth))?;
        Self::action_for(board, &best)
    }

    /// Picks a move using the iterative deepening search
    pub fn select_move_iterative(board: &Board, max_depth: u32) -> Result<usize> {
        let best = Minimax::new().iterative_deepening(board, Self::capped(max_depth))?;
        Self::action_for(board, &best)
    }

    // searching past the end of the game is wasted work
    fn capped(depth: u32) -> u32 {
        depth.min((ROWS * COLUMNS) as u32)
    }

    // recover the index that generates the chosen position
    fn action_for(board: &Board, chosen: &Board) -> Result<usize> {
        board
            .children_with_actions()
            .get(chosen)
            .copied()
            .ok_or_else(|| anyhow!("search returned a state not reachable in one move"))
    }
}
