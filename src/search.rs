//! Depth-bounded minimax search with alpha-beta pruning, per-search
//! memoization and an iterative deepening driver

use anyhow::{anyhow, ensure, Result};

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::board::{Board, Player};
use crate::{MAX_EVALUATION, MIN_EVALUATION};

// one node of the search tree; lives for the duration of a single visit
struct Node {
    state: Board,
    is_root: bool,
    is_max: bool,
    value: i64,
    alpha: i64,
    beta: i64,
}

impl Node {
    fn new(state: Board, is_root: bool, alpha: i64, beta: i64) -> Self {
        let is_max = state.turn() == Player::A;
        Self {
            // sentinels one step beyond the evaluation range, so the first
            // child always strictly improves
            value: if is_max { i64::MIN } else { i64::MAX },
            state,
            is_root,
            is_max,
            alpha,
            beta,
        }
    }

    fn root(state: Board) -> Self {
        Self::new(state, true, MIN_EVALUATION, MAX_EVALUATION)
    }

    // the mover forces a win no matter what the opponent does
    fn is_guaranteed_victory(&self) -> bool {
        (self.is_max && self.value == MAX_EVALUATION)
            || (!self.is_max && self.value == MIN_EVALUATION)
    }

    // the mover loses no matter what they do
    fn is_guaranteed_loss(&self) -> bool {
        (self.is_max && self.value == MIN_EVALUATION)
            || (!self.is_max && self.value == MAX_EVALUATION)
    }
}

/// An agent to search m,n,k game trees
///
/// # Notes
/// Evaluated positions are memoized per top-level search call; the table is
/// cleared on entry and holds nothing across moves. Entries are keyed by
/// remaining depth as well as position, so a transposition evaluated shallowly
/// is never reused where a deeper evaluation is expected.
pub struct Minimax {
    // remaining depth -> position -> fully searched value
    evaluated: HashMap<u32, HashMap<Board, i64>>,

    /// The number of nodes visited by the last search (for diagnostics only)
    pub node_count: usize,
}

impl Minimax {
    pub fn new() -> Self {
        Self {
            evaluated: HashMap::new(),
            node_count: 0,
        }
    }

    /// Searches to a fixed depth and returns the best position reachable in
    /// one move
    ///
    /// Fails if `depth` is less than 1 or the position has no moves.
    pub fn search(&mut self, root: &Board, depth: u32) -> Result<Board> {
        ensure!(depth >= 1, "invalid search depth: {}", depth);

        self.node_count = 0;
        let (_, best) = self.run(root, depth);
        match best {
            Some(best) => Ok(best),
            // a state with children always has at least one applicable move
            None => fallback_child(root),
        }
    }

    /// Searches at increasing depth limits up to `max_depth`
    ///
    /// Stops early once a depth proves a forced win, since deeper search
    /// cannot improve it. A depth that proves a forced loss is discarded in
    /// favour of the previous depth's recommendation when one exists; the
    /// shallower move may still profit from unforced errors.
    pub fn iterative_deepening(&mut self, root: &Board, max_depth: u32) -> Result<Board> {
        ensure!(max_depth >= 1, "invalid search depth: {}", max_depth);

        self.node_count = 0;
        let mut best = None;
        for depth in 1..=max_depth {
            let (node, result) = self.run(root, depth);

            if node.is_guaranteed_victory() {
                if result.is_some() {
                    best = result;
                }
                break;
            }
            if node.is_guaranteed_loss() {
                if best.is_none() {
                    best = result;
                }
                break;
            }
            if result.is_some() {
                best = result;
            }
        }
        match best {
            Some(best) => Ok(best),
            None => fallback_child(root),
        }
    }

    // one full alpha-beta pass with a fresh memo table
    fn run(&mut self, root: &Board, depth: u32) -> (Node, Option<Board>) {
        self.evaluated.clear();
        let mut node = Node::root(root.clone());
        let best = self.visit(&mut node, depth);
        (node, best)
    }

    fn visit(&mut self, node: &mut Node, depth: u32) -> Option<Board> {
        if node.is_max {
            self.max_value(node, depth)
        } else {
            self.min_value(node, depth)
        }
    }

    fn max_value(&mut self, current: &mut Node, depth: u32) -> Option<Board> {
        debug_assert!(current.is_max, "node isn't a maximizing node");
        self.node_count += 1;

        if current.state.is_game_over() || depth == 0 {
            current.value = current.state.evaluation();
            return None;
        }

        let mut children = current.state.children();
        // ordering by static evaluation improves pruning; only worth the
        // evaluation cost at the root
        if current.is_root {
            children.sort_by_cached_key(|child| Reverse(child.evaluation()));
        }

        let mut best = None;
        for child in children {
            let value = self.child_value(&child, current.alpha, current.beta, depth);
            if value > current.value {
                current.value = value;
                best = Some(child);
            }
            current.alpha = current.alpha.max(current.value);
            if current.alpha >= current.beta {
                break;
            }
        }
        best
    }

    fn min_value(&mut self, current: &mut Node, depth: u32) -> Option<Board> {
        debug_assert!(!current.is_max, "node isn't a minimizing node");
        self.node_count += 1;

        if current.state.is_game_over() || depth == 0 {
            current.value = current.state.evaluation();
            return None;
        }

        let mut children = current.state.children();
        if current.is_root {
            children.sort_by_cached_key(|child| child.evaluation());
        }

        let mut best = None;
        for child in children {
            let value = self.child_value(&child, current.alpha, current.beta, depth);
            if value < current.value {
                current.value = value;
                best = Some(child);
            }
            current.beta = current.beta.min(current.value);
            if current.beta <= current.alpha {
                break;
            }
        }
        best
    }

    // looks up or computes the fully-searched value of a child position at
    // one less remaining depth
    fn child_value(&mut self, child: &Board, alpha: i64, beta: i64, depth: u32) -> i64 {
        if let Some(&value) = self
            .evaluated
            .get(&(depth - 1))
            .and_then(|memo| memo.get(child))
        {
            return value;
        }

        let mut node = Node::new(child.clone(), false, alpha, beta);
        self.visit(&mut node, depth - 1);
        let value = node.value;
        self.evaluated
            .entry(depth - 1)
            .or_default()
            .insert(node.state, value);
        value
    }
}

impl Default for Minimax {
    fn default() -> Self {
        Self::new()
    }
}

fn fallback_child(root: &Board) -> Result<Board> {
    root.children()
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no moves available from this position"))
}
