//! An agent for playing m,n,k-in-a-row board games
//!
//! This agent uses depth-bounded minimax search with alpha-beta pruning
//! to pick a move for the current player on a configurable grid.
//!
//! # Basic Usage
//!
//! ```
//! use mnk_ai::{agent::MinimaxAgent, board::Board};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! let board = Board::from_moves(&[0, 4, 1, 5, 2, 6])?;
//! let best_move = MinimaxAgent::select_move(&board, 1)?;
//!
//! assert_eq!(best_move, 3);
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod board;

pub mod search;

pub mod agent;

mod test;

/// The number of rows on the game board
pub const ROWS: usize = 4;

/// The number of columns on the game board
pub const COLUMNS: usize = 4;

/// The run length needed to win the game
pub const WIN_CONDITION_LENGTH: usize = 4;

/// The evaluation of a position won by player A
pub const MAX_EVALUATION: i64 = i64::MAX - 1;

/// The evaluation of a position won by player B
pub const MIN_EVALUATION: i64 = i64::MIN + 1;

// every cell index must fit a base-3 digit of the u64 position hash
const_assert!(ROWS * COLUMNS <= 40);

// a winning run must fit on the board
const_assert!(WIN_CONDITION_LENGTH <= ROWS || WIN_CONDITION_LENGTH <= COLUMNS);
