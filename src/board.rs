//! The game board state machine: legality, win/draw detection, hashing,
//! symmetry detection and the heuristic static evaluation

use anyhow::{ensure, Result};

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::{COLUMNS, MAX_EVALUATION, MIN_EVALUATION, ROWS, WIN_CONDITION_LENGTH};

/// Weight multiplier applied per adjacent friendly mark when scoring a line
const WIN_POTENTIAL_ADJACENCY_MULTIPLIER: i64 = 10;

// the four line directions through a cell: horizontal, vertical and both diagonals
const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Player {
    A,
    B,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    /// The mark drawn for this player on a rendered grid
    pub fn mark(self) -> char {
        match self {
            Player::A => 'X',
            Player::B => 'O',
        }
    }

    // base-3 digit used by the position hash; 0 is reserved for blank cells
    fn ordinal(self) -> u64 {
        match self {
            Player::A => 1,
            Player::B => 2,
        }
    }
}

/// A snapshot of a game in progress
///
/// A board is mutated in place by [`apply_move`] during real play, or cloned
/// to explore a hypothetical move without disturbing the original. `Clone` is
/// a deep copy: the grid and both index sets share no storage with the source.
///
/// [`apply_move`]: #method.apply_move
#[derive(Clone, Debug)]
pub struct Board {
    // cells are stored in row-major order, left-to-right, top-to-bottom
    cells: [Option<Player>; ROWS * COLUMNS],
    turn: Player,
    winner: Option<Player>,
    game_over: bool,
    available: BTreeSet<usize>,
    played: BTreeSet<usize>,
    move_count: usize,
    hash: u64,
}

impl Board {
    /// Creates a blank board with player A to move
    pub fn new() -> Self {
        Self {
            cells: [None; ROWS * COLUMNS],
            turn: Player::A,
            winner: None,
            game_over: false,
            available: (0..ROWS * COLUMNS).collect(),
            played: BTreeSet::new(),
            move_count: 0,
            hash: 0,
        }
    }

    /// Replays a sequence of cell indices from a blank board
    pub fn from_moves(moves: &[usize]) -> Result<Self> {
        let mut board = Self::new();

        for &index in moves {
            ensure!(index < ROWS * COLUMNS, "move index {} out of range", index);
            ensure!(!board.game_over, "invalid position, game is over");
            ensure!(
                board.apply_move(index),
                "invalid move, cell {} is occupied",
                index
            );
        }
        Ok(board)
    }

    /// Places a mark for the current player at the given row-major index
    ///
    /// Returns `false` without mutating anything if the cell is occupied.
    ///
    /// # Panics
    /// Panics if the game is already over or the index is out of range;
    /// both are caller bugs, not runtime conditions.
    pub fn apply_move(&mut self, index: usize) -> bool {
        assert!(!self.game_over, "game over, no more moves can be played");
        assert!(index < ROWS * COLUMNS, "move index {} out of range", index);

        if self.cells[index].is_some() {
            return false;
        }
        self.cells[index] = Some(self.turn);
        self.move_count += 1;
        self.available.remove(&index);
        self.played.insert(index);
        self.hash += self.turn.ordinal() * 3u64.pow(index as u32);

        let (x, y) = (index % COLUMNS, index / COLUMNS);
        if self.is_winning_cell(x, y, self.turn) {
            self.winner = Some(self.turn);
            self.game_over = true;
        } else if self.move_count == ROWS * COLUMNS {
            self.winner = None;
            self.game_over = true;
        }

        if !self.game_over {
            self.turn = self.turn.opponent();
        }
        true
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// The player whose move is next
    pub fn turn(&self) -> Player {
        self.turn
    }

    /// The winning player, or `None` for a draw
    ///
    /// # Panics
    /// Panics if the game is not over yet.
    pub fn winner(&self) -> Option<Player> {
        assert!(self.game_over, "game is not over yet");
        self.winner
    }

    /// Indices of all blank cells
    pub fn available_moves(&self) -> &BTreeSet<usize> {
        &self.available
    }

    /// Indices of all occupied cells
    pub fn played_moves(&self) -> &BTreeSet<usize> {
        &self.played
    }

    pub fn move_count(&self) -> usize {
        self.move_count
    }

    /// The base-3 position encoding; equal boards always share it
    pub fn position_hash(&self) -> u64 {
        self.hash
    }

    pub fn is_blank(&self, index: usize) -> bool {
        self.cells[index].is_none()
    }

    /// The mark at the given row and column
    pub fn at(&self, y: usize, x: usize) -> Option<Player> {
        self.cells[y * COLUMNS + x]
    }

    // the mark at a possibly out-of-bounds coordinate, x before y to match
    // the direction tuples
    fn at_offset(&self, x: isize, y: isize) -> Option<Option<Player>> {
        if x < 0 || x >= COLUMNS as isize || y < 0 || y >= ROWS as isize {
            None
        } else {
            Some(self.cells[y as usize * COLUMNS + x as usize])
        }
    }

    // length of the run of `player` marks starting next to (x, y) in one direction
    fn run_length(&self, x: usize, y: usize, dx: isize, dy: isize, player: Player) -> usize {
        let mut run = 0;
        let (mut cx, mut cy) = (x as isize + dx, y as isize + dy);
        while self.at_offset(cx, cy) == Some(Some(player)) {
            run += 1;
            cx += dx;
            cy += dy;
        }
        run
    }

    // a move wins if the run through the played cell reaches the win length
    // in any of the four line directions
    fn is_winning_cell(&self, x: usize, y: usize, player: Player) -> bool {
        DIRECTIONS.iter().any(|&(dx, dy)| {
            1 + self.run_length(x, y, dx, dy, player) + self.run_length(x, y, -dx, -dy, player)
                >= WIN_CONDITION_LENGTH
        })
    }

    /// The static evaluation of the position
    ///
    /// Terminal positions evaluate to [`MAX_EVALUATION`], [`MIN_EVALUATION`]
    /// or 0; anything else gets the win-potential heuristic adjusted for
    /// whose turn it is.
    pub fn evaluation(&self) -> i64 {
        if self.game_over {
            return self.utility();
        }
        if self.played.is_empty() {
            return 0;
        }
        self.improve_evaluation_accuracy(self.superficial_evaluation())
    }

    fn utility(&self) -> i64 {
        match self.winner {
            Some(Player::A) => MAX_EVALUATION,
            Some(Player::B) => MIN_EVALUATION,
            None => 0,
        }
    }

    // sum of the directional win potentials of every occupied cell
    fn superficial_evaluation(&self) -> i64 {
        let mut evaluation = 0;
        for &index in &self.played {
            let (x, y) = (index % COLUMNS, index / COLUMNS);
            let player = match self.cells[index] {
                Some(player) => player,
                None => panic!("played index {} is blank", index),
            };
            for &(dx, dy) in &DIRECTIONS {
                evaluation += self.line_win_potential(x, y, dx, dy, player);
            }
        }
        evaluation
    }

    /// Scores one line direction through an occupied cell
    ///
    /// A direction only counts if its unobstructed window can still hold a
    /// winning run. Each run is scored once, anchored at its first cell in
    /// scan order; every further friendly mark in the window multiplies the
    /// weight by [`WIN_POTENTIAL_ADJACENCY_MULTIPLIER`].
    fn line_win_potential(&self, x: usize, y: usize, dx: isize, dy: isize, player: Player) -> i64 {
        let cell = self.cells[y * COLUMNS + x];
        assert!(cell.is_some(), "no win potential for a blank cell");
        assert_eq!(cell, Some(player), "cell does not match the given player");

        let opponent = player.opponent();
        let mut window = 1;
        let mut potential = 1;

        let (mut cx, mut cy) = (x as isize - dx, y as isize - dy);
        while let Some(mark) = self.at_offset(cx, cy) {
            if mark == Some(opponent) {
                break;
            }
            if mark == Some(player) {
                // not the anchor of this run, it was already scored
                return 0;
            }
            window += 1;
            cx -= dx;
            cy -= dy;
        }

        let (mut cx, mut cy) = (x as isize + dx, y as isize + dy);
        while let Some(mark) = self.at_offset(cx, cy) {
            if mark == Some(opponent) {
                break;
            }
            if mark == Some(player) {
                potential *= WIN_POTENTIAL_ADJACENCY_MULTIPLIER;
            }
            window += 1;
            cx += dx;
            cy += dy;
        }

        if window < WIN_CONDITION_LENGTH {
            return 0;
        }
        match player {
            Player::A => potential,
            Player::B => -potential,
        }
    }

    // normalizes the raw heuristic to its power-of-ten band, then boosts it
    // past the next band when it favours the side about to move. A pending
    // near-term win for the mover must outrank every non-winning sibling.
    fn improve_evaluation_accuracy(&self, evaluation: i64) -> i64 {
        let mut magnitude = 0;
        while WIN_POTENTIAL_ADJACENCY_MULTIPLIER.pow(magnitude + 1) <= evaluation.abs() {
            magnitude += 1;
        }
        let power = WIN_POTENTIAL_ADJACENCY_MULTIPLIER.pow(magnitude);
        let higher_power = WIN_POTENTIAL_ADJACENCY_MULTIPLIER.pow(magnitude + 1);

        if evaluation > 0 {
            if self.turn == Player::A {
                evaluation - power + higher_power
            } else {
                evaluation - power
            }
        } else if evaluation < 0 {
            if self.turn == Player::B {
                evaluation + power - higher_power
            } else {
                evaluation + power
            }
        } else {
            0
        }
    }

    /// The positions reachable in one move, deduplicated by symmetry
    ///
    /// While fewer than `max(ROWS, COLUMNS)` moves have been played, a
    /// candidate child symmetric to an already-accepted child is discarded.
    /// Past that point positions have diverged enough that the check stops
    /// paying for itself.
    pub fn children(&self) -> Vec<Board> {
        let mut children: Vec<Board> = Vec::with_capacity(self.available.len());
        if self.game_over {
            return children;
        }

        let symmetry_move_limit = ROWS.max(COLUMNS);
        for &index in &self.available {
            let mut child = self.clone();
            child.apply_move(index);
            if self.move_count >= symmetry_move_limit
                || !children.iter().any(|accepted| child.is_symmetric_to(accepted))
            {
                children.push(child);
            }
        }
        children
    }

    /// Every position reachable in one move, keyed back to its generating index
    pub fn children_with_actions(&self) -> HashMap<Board, usize> {
        let mut children = HashMap::with_capacity(self.available.len());
        if self.game_over {
            return children;
        }

        for &index in &self.available {
            let mut child = self.clone();
            child.apply_move(index);
            children.insert(child, index);
        }
        children
    }

    /// Whether any mirror, rotation or (on square boards) diagonal reflection
    /// maps every cell of `self` onto an equal cell of `other`
    fn is_symmetric_to(&self, other: &Board) -> bool {
        let square = ROWS == COLUMNS;
        let mut horizontal = true;
        let mut vertical = true;
        let mut half_rotation = true;
        let mut lr_diagonal = square;
        let mut rl_diagonal = square;
        let mut clockwise = square;
        let mut counter_clockwise = square;

        for y in 0..ROWS {
            for x in 0..COLUMNS {
                let cell = self.at(y, x);
                if horizontal && cell != other.at(y, COLUMNS - x - 1) {
                    horizontal = false;
                }
                if vertical && cell != other.at(ROWS - y - 1, x) {
                    vertical = false;
                }
                if half_rotation && cell != other.at(ROWS - y - 1, COLUMNS - x - 1) {
                    half_rotation = false;
                }
                if lr_diagonal && cell != other.at(x, y) {
                    lr_diagonal = false;
                }
                if rl_diagonal && cell != other.at(ROWS - x - 1, COLUMNS - y - 1) {
                    rl_diagonal = false;
                }
                if clockwise && cell != other.at(x, COLUMNS - y - 1) {
                    clockwise = false;
                }
                if counter_clockwise && cell != other.at(ROWS - x - 1, y) {
                    counter_clockwise = false;
                }
            }
        }

        horizontal
            || vertical
            || half_rotation
            || lr_diagonal
            || rl_diagonal
            || clockwise
            || counter_clockwise
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

// the hash comparison is a fast pre-check, never a substitute for comparing cells
impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.cells == other.cells
    }
}

impl Eq for Board {}

impl std::hash::Hash for Board {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for x in 0..COLUMNS {
            write!(f, "{} ", x)?;
        }
        writeln!(f)?;

        for y in 0..ROWS {
            write!(f, "{} ", y)?;
            for x in 0..COLUMNS {
                match self.at(y, x) {
                    Some(player) => write!(f, "{} ", player.mark())?,
                    None => write!(f, "- ")?,
                }
            }
            if y != ROWS - 1 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
